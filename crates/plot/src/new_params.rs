use std::path::Path;

use hindsight_core::{
    AnalysisReport, analysis::parameters::ParameterConvergence, log::EvaluationLog,
};
use plotters::prelude::*;

use crate::{
    PlotError,
    layout::{fitness_color, padded_range},
    parameters::{Panels, draw_grid},
};

/// Draws the designated new parameters, each point coloured by its fitness,
/// with bounds, default, and best value marked.
///
/// # Errors
///
/// Returns a [`PlotError`] if drawing fails.
pub fn render(path: &Path, log: &EvaluationLog, report: &AnalysisReport) -> Result<(), PlotError> {
    let rows: Vec<ParameterConvergence> = report
        .new_parameter_rows()
        .into_iter()
        .map(|row| row.convergence.clone())
        .collect();

    let range = padded_range(log.fitness());
    let options = Panels {
        title: "New parameters (red = best fitness)",
        show_default: true,
    };

    draw_grid(path, log, &rows, &options, |fitness| {
        fitness_color(fitness, &range).filled()
    })
}
