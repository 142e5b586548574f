use tracing::info;

use crate::{
    Config, InsufficientDataError,
    analysis::{
        convergence::{self, ConvergenceSummary},
        correlation::{self, CorrelationEntry, CorrelationSummary},
        parameters::{self, BoundHug, ParameterConvergence, Spread},
        survival::{self, SurvivalSummary},
    },
    log::EvaluationLog,
    registry::ParameterRegistry,
};

/// One parameter of the best evaluation, placed within its bounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BestParameter {
    pub name: String,
    pub value: f64,

    /// `(value - lower) / (upper - lower) * 100`.
    pub percent_of_range: f64,
}

/// Convergence and correlation of a designated new parameter, side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewParameterRow<'a> {
    pub convergence: &'a ParameterConvergence,
    pub correlation: Option<&'a CorrelationEntry>,
}

/// Everything the analyzers concluded about one evaluation log.
///
/// A report is a plain snapshot. Building it twice from the same log and
/// configuration yields identical values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnalysisReport {
    pub evaluations: usize,
    pub convergence: ConvergenceSummary,
    pub survival: SurvivalSummary,

    /// Per-parameter convergence, in registry order.
    pub parameters: Vec<ParameterConvergence>,

    pub correlations: CorrelationSummary,

    /// Parameter values of the best evaluation, in registry order.
    pub best_configuration: Vec<BestParameter>,
}

impl AnalysisReport {
    /// Runs every analyzer over `log` and gathers the results.
    ///
    /// # Errors
    ///
    /// Returns an [`InsufficientDataError`] if the log is empty.
    pub fn synthesize(
        log: &EvaluationLog,
        registry: &ParameterRegistry,
        config: &Config,
    ) -> Result<Self, InsufficientDataError> {
        let convergence = convergence::analyze(log, config.convergence())?;
        let survival = survival::estimate(log, config.survival())?;
        let parameters = parameters::classify(log, registry, config.classifier())?;
        let correlations = correlation::correlate(log, config.correlation())?;

        let best = log.best()?;
        let best_configuration = log
            .parameter_names()
            .iter()
            .filter_map(|name| {
                let spec = registry.spec_for(name).ok()?;
                let value = best.parameter(name)?;
                Some(BestParameter {
                    name: name.clone(),
                    value,
                    percent_of_range: spec.percent_of_range(value),
                })
            })
            .collect();

        info!(
            evaluations = log.len(),
            best_eval = convergence.best.eval,
            best_fitness = convergence.best.fitness,
            verdict = %convergence.verdict,
            "analysis complete"
        );

        Ok(Self {
            evaluations: log.len(),
            convergence,
            survival,
            parameters,
            correlations,
            best_configuration,
        })
    }

    /// Looks up the convergence row of one parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterConvergence> {
        self.parameters.iter().find(|row| row.name() == name)
    }

    /// Parameters in the given spread tier, in registry order.
    pub fn with_spread(&self, spread: Spread) -> impl Iterator<Item = &ParameterConvergence> {
        self.parameters
            .iter()
            .filter(move |row| row.status.spread == spread)
    }

    /// Parameters whose tail mean sits against a bound, in registry order.
    pub fn hugging_bounds(&self) -> impl Iterator<Item = &ParameterConvergence> {
        self.parameters
            .iter()
            .filter(|row| row.status.bound != BoundHug::None)
    }

    /// Rows for the designated new parameters that the log carries.
    #[must_use]
    pub fn new_parameter_rows(&self) -> Vec<NewParameterRow<'_>> {
        self.parameters
            .iter()
            .filter(|row| row.shift_from_default_pct.is_some())
            .map(|row| NewParameterRow {
                convergence: row,
                correlation: self.correlations.get(row.name()),
            })
            .collect()
    }
}
