//! Interactive convergence window.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoint, Points};
use hindsight_core::{AnalysisReport, log::EvaluationLog};

use crate::layout::evals_as_f64;

/// A runnable egui window showing fitness, best-so-far, and rolling mean.
///
/// # Example
///
/// ```ignore
/// ConvergenceViewer::new(&log, &report).run("hindsight")?;
/// ```
pub struct ConvergenceViewer {
    fitness: Vec<PlotPoint>,
    best_so_far: Vec<PlotPoint>,
    rolling_mean: Vec<PlotPoint>,
}

fn points(xs: &[f64], ys: &[f64]) -> Vec<PlotPoint> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| PlotPoint::new(x, y))
        .collect()
}

impl ConvergenceViewer {
    #[must_use]
    pub fn new(log: &EvaluationLog, report: &AnalysisReport) -> Self {
        let evals = evals_as_f64(&log.evals());
        Self {
            fitness: points(&evals, &log.fitness()),
            best_so_far: points(&evals, &report.convergence.best_so_far),
            rolling_mean: points(&evals, &report.convergence.rolling_mean),
        }
    }

    /// Opens a blocking window until the user closes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the native window cannot be created.
    pub fn run(self, title: &str) -> Result<(), eframe::Error> {
        eframe::run_native(
            title,
            eframe::NativeOptions::default(),
            Box::new(|_cc| Ok(Box::new(self))),
        )
    }
}

impl eframe::App for ConvergenceViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("convergence")
                .legend(Legend::default())
                .x_axis_label("evaluation")
                .y_axis_label("fitness")
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new(self.fitness.as_slice())
                            .radius(1.5)
                            .name("evaluation"),
                    );
                    plot_ui.line(Line::new(self.best_so_far.as_slice()).name("best so far"));
                    plot_ui.line(Line::new(self.rolling_mean.as_slice()).name("rolling mean"));
                });
        });
    }
}
