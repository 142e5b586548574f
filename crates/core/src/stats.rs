//! Descriptive statistics shared by the analyzers.
//!
//! These helpers fix the numeric conventions used throughout the crate:
//!
//! - Aggregates over an empty slice return `None` rather than `NaN`.
//! - A series whose values are all identical has a standard deviation of
//!   exactly `0.0` and a correlation of `NaN` with anything, regardless of
//!   floating-point rounding in the mean.
//! - Rolling windows are partial at the start of a series.

/// Returns `true` if every value equals the first.
///
/// An empty slice is constant.
#[must_use]
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Returns the arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Returns the sample standard deviation (`n - 1` denominator).
///
/// A single value has a standard deviation of `0.0` by convention, as does
/// any constant series. Returns `None` for an empty slice.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if is_constant(values) {
        return Some(0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let dof = (values.len() - 1) as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / dof).sqrt())
}

/// Returns the median, or `None` for an empty slice.
///
/// Even-length slices average the two middle values.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Returns the smallest value, or `None` for an empty slice.
#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Returns the largest value, or `None` for an empty slice.
#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Returns the running minimum of a series.
///
/// Element `i` is the minimum of `values[0..=i]`.
#[must_use]
pub fn cumulative_min(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(f64::INFINITY, |best, &v| {
            *best = best.min(v);
            Some(*best)
        })
        .collect()
}

/// Returns the trailing rolling mean of a series.
///
/// Element `i` is the mean of the last `min(window, i + 1)` values ending at
/// `i`, so the first elements average partial windows. A `window` of zero is
/// treated as one.
#[must_use]
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            // Windows are never empty, unwrap is safe
            mean(&values[start..=i]).unwrap()
        })
        .collect()
}

/// Returns the Pearson correlation coefficient of two paired series.
///
/// Returns `NaN` when either series has zero variance (including a series
/// of fewer than two values), since the coefficient is undefined there.
///
/// # Panics
///
/// Panics if the series have different lengths.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    assert_eq!(xs.len(), ys.len(), "paired series must have equal length");

    if xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return f64::NAN;
    }

    // Non-empty, unwrap is safe
    let mean_x = mean(xs).unwrap();
    let mean_y = mean(ys).unwrap();

    let (sxy, sxx, syy) = xs.iter().zip(ys).fold((0.0, 0.0, 0.0), |acc, (x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (acc.0 + dx * dy, acc.1 + dx * dx, acc.2 + dy * dy)
    });

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
