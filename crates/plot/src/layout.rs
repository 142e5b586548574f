//! Axis, grid, and colour helpers shared by the charts.

use std::ops::Range;

use plotters::style::HSLColor;

/// Returns a range covering every finite value with 5% padding on each side.
///
/// Falls back to `-1..1` when no value is finite, and widens a single-valued
/// range by one unit each side.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() {
        return -1.0..1.0;
    }
    if hi - lo < f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Returns `(rows, columns)` for laying out `n` panels at most `max_cols` wide.
pub(crate) fn grid_shape(n: usize, max_cols: usize) -> (usize, usize) {
    let cols = n.clamp(1, max_cols.max(1));
    (n.div_ceil(cols).max(1), cols)
}

/// One histogram bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Counts finite values into `bins` equal-width bins spanning their range.
///
/// The maximum lands in the last bin. A single distinct value yields one bin.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(lo) = finite.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let hi = finite.iter().copied().fold(lo, f64::max);

    if bins == 0 || hi <= lo {
        return vec![Bin {
            start: lo - 0.5,
            end: hi + 0.5,
            count: finite.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0_usize; bins];
    for v in finite {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = (((v - lo) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Maps fitness onto a blue-to-red hue, red being the best (lowest) fitness.
pub(crate) fn fitness_color(fitness: f64, range: &Range<f64>) -> HSLColor {
    let span = range.end - range.start;
    let t = if span > 0.0 {
        ((fitness - range.start) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };
    HSLColor(0.66 * t, 0.8, 0.45)
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn evals_as_f64(evals: &[u64]) -> Vec<f64> {
    evals.iter().map(|&e| e as f64).collect()
}
