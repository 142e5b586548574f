use std::path::Path;

use hindsight_core::{AnalysisReport, log::EvaluationLog};
use plotters::prelude::*;

use crate::{
    PlotError,
    layout::{evals_as_f64, padded_range},
};

/// Draws fitness against evaluation with the best-so-far curve above a panel
/// of the rolling mean.
///
/// # Errors
///
/// Returns a [`PlotError`] if drawing fails.
pub fn render(path: &Path, log: &EvaluationLog, report: &AnalysisReport) -> Result<(), PlotError> {
    let evals = evals_as_f64(&log.evals());
    let fitness = log.fitness();
    let summary = &report.convergence;

    let x_range = padded_range(evals.iter().copied());
    let y_range = padded_range(fitness.iter().copied());

    let root = BitMapBackend::new(path, (1400, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let mut chart = ChartBuilder::on(&panels[0])
        .caption(
            format!("Fitness over {} evaluations", report.evaluations),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc("evaluation")
        .y_desc("fitness (lower is better)")
        .draw()?;

    chart
        .draw_series(
            evals
                .iter()
                .zip(&fitness)
                .map(|(&x, &y)| Circle::new((x, y), 2, BLUE.mix(0.4).filled())),
        )?
        .label("evaluation")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

    chart
        .draw_series(LineSeries::new(
            evals.iter().copied().zip(summary.best_so_far.iter().copied()),
            RED.stroke_width(2),
        ))?
        .label("best so far")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    let best = summary.best;
    #[allow(clippy::cast_precision_loss)]
    let best_point = (best.eval as f64, best.fitness);
    chart
        .draw_series(std::iter::once(TriangleMarker::new(
            best_point,
            8,
            BLACK.filled(),
        )))?
        .label(format!("best (eval {})", best.eval))
        .legend(|(x, y)| TriangleMarker::new((x + 10, y), 5, BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let rolling_range = padded_range(summary.rolling_mean.iter().copied());
    let mut rolling = ChartBuilder::on(&panels[1])
        .caption(
            format!("Rolling mean fitness ({})", summary.verdict),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, rolling_range)?;

    rolling
        .configure_mesh()
        .x_desc("evaluation")
        .y_desc("rolling mean")
        .draw()?;

    rolling.draw_series(LineSeries::new(
        evals.iter().copied().zip(summary.rolling_mean.iter().copied()),
        &GREEN,
    ))?;

    root.present()?;
    Ok(())
}
