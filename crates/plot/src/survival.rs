use std::path::Path;

use hindsight_core::{AnalysisReport, log::EvaluationLog};
use plotters::prelude::*;
use uom::si::time::second;

use crate::{
    PlotError,
    layout::{evals_as_f64, histogram, padded_range},
};

const HISTOGRAM_BINS: usize = 30;

/// Draws estimated survival per evaluation next to a histogram of it.
///
/// # Errors
///
/// Returns a [`PlotError`] if drawing fails.
#[allow(clippy::cast_precision_loss)]
pub fn render(path: &Path, log: &EvaluationLog, report: &AnalysisReport) -> Result<(), PlotError> {
    let summary = &report.survival;
    let evals = evals_as_f64(&log.evals());
    let seconds: Vec<f64> = summary
        .estimates
        .iter()
        .map(|e| e.duration.get::<second>())
        .collect();
    let rolling: Vec<f64> = summary
        .rolling_duration
        .iter()
        .map(|d| d.get::<second>())
        .collect();
    let cap = summary.cap_duration.get::<second>();

    let x_range = padded_range(evals.iter().copied());
    let y_range = padded_range(seconds.iter().copied().chain([0.0, cap]));

    let root = BitMapBackend::new(path, (1600, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let mut chart = ChartBuilder::on(&panels[0])
        .caption("Estimated survival", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc("evaluation")
        .y_desc("survival (s)")
        .draw()?;

    chart
        .draw_series(
            evals
                .iter()
                .zip(&summary.estimates)
                .zip(&seconds)
                .map(|((&x, estimate), &y)| {
                    let color = if estimate.likely_hit_cap { RED } else { BLUE };
                    Circle::new((x, y), 2, color.mix(0.5).filled())
                }),
        )?
        .label("evaluation")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, cap), (x_range.end, cap)],
            BLACK.mix(0.6).stroke_width(2),
        )))?
        .label(format!("cap ({cap:.0} s)"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    chart
        .draw_series(LineSeries::new(
            evals.iter().copied().zip(rolling),
            GREEN.stroke_width(2),
        ))?
        .label("rolling mean")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let bins = histogram(&seconds, HISTOGRAM_BINS);
    let bin_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => 0.0..1.0,
    };
    let count_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut hist = ChartBuilder::on(&panels[1])
        .caption("Survival distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(bin_range, 0.0..count_max * 1.1)?;

    hist.configure_mesh()
        .x_desc("survival (s)")
        .y_desc("count")
        .draw()?;

    hist.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            BLUE.mix(0.6).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}
