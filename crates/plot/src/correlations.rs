use std::path::Path;

use hindsight_core::{AnalysisReport, log::EvaluationLog};
use plotters::prelude::*;

use crate::PlotError;

const BAR_HALF_WIDTH: f64 = 0.38;

/// Draws one pair of horizontal bars per parameter: correlation over every
/// evaluation and over the best-fitness subset.
///
/// Parameters run top to bottom in ranked order. Undefined correlations
/// draw no bar.
///
/// # Errors
///
/// Returns a [`PlotError`] if drawing fails.
#[allow(clippy::cast_precision_loss)]
pub fn render(path: &Path, _log: &EvaluationLog, report: &AnalysisReport) -> Result<(), PlotError> {
    let entries = &report.correlations.entries;
    let n = entries.len().max(1);

    #[allow(clippy::cast_possible_truncation)]
    let height = 120 + 28 * n as u32;
    let root = BitMapBackend::new(path, (1100, height)).into_drawing_area();
    root.fill(&WHITE)?;

    // Row `i` is centred on `n - 1 - i` so the strongest sits on top.
    let row_y = |i: usize| (n - 1 - i) as f64;
    let names: Vec<&str> = entries.iter().map(|e| e.parameter.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Correlation with fitness (top {} of {})",
                report.correlations.top_count, report.evaluations
            ),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(180)
        .build_cartesian_2d(-1.0..1.0, -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Pearson r (negative: larger values give better fitness)")
        .y_labels(n)
        .y_label_formatter(&|y| {
            let i = y.round();
            if (y - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let from_top = n - 1 - (i as usize).min(n - 1);
            names.get(from_top).map(|s| (*s).to_owned()).unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, -0.5), (0.0, n as f64 - 0.5)],
        BLACK,
    )))?;

    chart
        .draw_series(
            entries
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.all.is_nan())
                .map(|(i, e)| {
                    let y = row_y(i);
                    Rectangle::new([(0.0, y), (e.all, y + BAR_HALF_WIDTH)], BLUE.filled())
                }),
        )?
        .label("all evaluations")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], BLUE.filled()));

    chart
        .draw_series(
            entries
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.top.is_nan())
                .map(|(i, e)| {
                    let y = row_y(i);
                    Rectangle::new(
                        [(0.0, y - BAR_HALF_WIDTH), (e.top, y)],
                        RED.mix(0.7).filled(),
                    )
                }),
        )?
        .label("best evaluations")
        .legend(|(x, y)| {
            Rectangle::new([(x, y - 4), (x + 16, y + 4)], RED.mix(0.7).filled())
        });

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
