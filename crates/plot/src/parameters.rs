use std::path::Path;

use hindsight_core::{
    AnalysisReport, analysis::parameters::ParameterConvergence, log::EvaluationLog, stats,
};
use plotters::{coord::Shift, prelude::*};

use crate::{
    PlotError, TRACE_ROLLING_WINDOW,
    layout::{evals_as_f64, grid_shape, padded_range},
};

const COLUMNS: usize = 5;
const PANEL_SIZE: (u32, u32) = (420, 300);

/// Draws one panel per parameter: its values by evaluation, their rolling
/// mean, the declared bounds, and the value at the best evaluation.
///
/// # Errors
///
/// Returns a [`PlotError`] if drawing fails.
pub fn render(path: &Path, log: &EvaluationLog, report: &AnalysisReport) -> Result<(), PlotError> {
    let options = Panels {
        title: "Parameter convergence",
        show_default: false,
    };
    draw_grid(path, log, &report.parameters, &options, |_| {
        BLUE.mix(0.35).filled()
    })
}

/// Options for a grid of parameter panels.
pub(crate) struct Panels<'a> {
    pub title: &'a str,

    /// Draws the declared default as a horizontal line.
    pub show_default: bool,
}

/// Draws a grid of parameter traces, colouring each point with `style`.
///
/// `style` receives the fitness of the evaluation behind the point.
pub(crate) fn draw_grid(
    path: &Path,
    log: &EvaluationLog,
    rows: &[ParameterConvergence],
    options: &Panels<'_>,
    style: impl Fn(f64) -> ShapeStyle,
) -> Result<(), PlotError> {
    let title = options.title;
    let (grid_rows, grid_cols) = grid_shape(rows.len(), COLUMNS);
    #[allow(clippy::cast_possible_truncation)]
    let size = (
        PANEL_SIZE.0 * grid_cols as u32,
        PANEL_SIZE.1 * grid_rows as u32 + 40,
    );

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    if rows.is_empty() {
        root.titled(&format!("{title}: no parameters"), ("sans-serif", 24))?;
        root.present()?;
        return Ok(());
    }

    let body = root.titled(title, ("sans-serif", 24))?;
    let panels = body.split_evenly((grid_rows, grid_cols));

    let evals = evals_as_f64(&log.evals());
    let fitness = log.fitness();

    for (panel, row) in panels.iter().zip(rows) {
        let values = log.parameter_series(row.name()).unwrap_or_default();
        draw_panel(panel, &evals, &fitness, &values, row, options, &style)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    evals: &[f64],
    fitness: &[f64],
    values: &[f64],
    row: &ParameterConvergence,
    options: &Panels<'_>,
    style: &impl Fn(f64) -> ShapeStyle,
) -> Result<(), PlotError> {
    let spec = &row.spec;
    let x_range = padded_range(evals.iter().copied());
    let y_range = padded_range(
        values
            .iter()
            .copied()
            .chain([spec.lower(), spec.upper()])
            .chain(options.show_default.then(|| spec.default_value())),
    );

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{} [{}]", spec.name(), row.status), ("sans-serif", 14))
        .margin(6)
        .x_label_area_size(22)
        .y_label_area_size(48)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_labels(4)
        .y_labels(5)
        .label_style(("sans-serif", 10))
        .draw()?;

    chart.draw_series(
        evals
            .iter()
            .zip(values)
            .zip(fitness)
            .map(|((&x, &y), &f)| Circle::new((x, y), 2, style(f))),
    )?;

    let rolling = stats::rolling_mean(values, TRACE_ROLLING_WINDOW);
    chart.draw_series(LineSeries::new(
        evals.iter().copied().zip(rolling),
        BLACK.stroke_width(1),
    ))?;

    for bound in [spec.lower(), spec.upper()] {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, bound), (x_range.end, bound)],
            RED.mix(0.7),
        )))?;
    }
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_range.start, row.best_value), (x_range.end, row.best_value)],
        GREEN.stroke_width(2),
    )))?;
    if options.show_default {
        let default = spec.default_value();
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, default), (x_range.end, default)],
            MAGENTA.mix(0.8),
        )))?;
    }

    Ok(())
}
