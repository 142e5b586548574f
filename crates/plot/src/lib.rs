//! Charts for hindsight analysis reports.
//!
//! Each chart is a PNG drawn with `plotters` from an [`EvaluationLog`] and
//! the [`AnalysisReport`] synthesized from it. [`render_all`] writes the full
//! set into one directory:
//!
//! | file                         | content                                             |
//! |------------------------------|-----------------------------------------------------|
//! | `convergence.png`            | fitness scatter, best-so-far, rolling mean          |
//! | `survival.png`               | estimated survival, cap line, histogram             |
//! | `parameter_convergence.png`  | one trace per parameter with bounds and best value  |
//! | `correlations.png`           | correlation bars over all and top evaluations       |
//! | `new_params.png`             | fitness-coloured traces of the new parameters       |
//!
//! # Features
//!
//! - `viewer`: enables [`ConvergenceViewer`], an interactive egui window.
//!   This feature adds dependencies on `eframe` and `egui_plot`.

mod convergence;
mod correlations;
mod layout;
mod new_params;
mod parameters;
mod survival;

#[cfg(feature = "viewer")]
mod viewer;

use std::{
    error::Error as StdError,
    fs,
    path::{Path, PathBuf},
};

use hindsight_core::{AnalysisReport, log::EvaluationLog};
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;
use tracing::info;

pub use convergence::render as render_convergence;
pub use correlations::render as render_correlations;
pub use new_params::render as render_new_parameters;
pub use parameters::render as render_parameter_convergence;
pub use survival::render as render_survival;

#[cfg(feature = "viewer")]
pub use viewer::ConvergenceViewer;

/// Window used for the rolling means drawn over parameter traces.
pub const TRACE_ROLLING_WINDOW: usize = 10;

/// Errors that can occur while writing charts.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to create output directory `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to draw chart")]
    Drawing(#[source] Box<dyn StdError + Send + Sync>),
}

impl<E> From<DrawingAreaErrorKind<E>> for PlotError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(Box::new(err))
    }
}

/// Signature shared by every chart renderer.
type Renderer = fn(&Path, &EvaluationLog, &AnalysisReport) -> Result<(), PlotError>;

const CHARTS: [(&str, Renderer); 5] = [
    ("convergence.png", convergence::render),
    ("survival.png", survival::render),
    ("parameter_convergence.png", parameters::render),
    ("correlations.png", correlations::render),
    ("new_params.png", new_params::render),
];

/// Writes every chart into `dir`, creating it if needed.
///
/// Returns the paths written, in a fixed order.
///
/// # Errors
///
/// Returns a [`PlotError`] if the directory cannot be created or a chart
/// fails to draw.
pub fn render_all(
    dir: &Path,
    log: &EvaluationLog,
    report: &AnalysisReport,
) -> Result<Vec<PathBuf>, PlotError> {
    fs::create_dir_all(dir).map_err(|source| PlotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(CHARTS.len());
    for (file, render) in CHARTS {
        let path = dir.join(file);
        render(&path, log, report)?;
        info!(path = %path.display(), "wrote chart");
        written.push(path);
    }
    Ok(written)
}
