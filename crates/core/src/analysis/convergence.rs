//! Convergence state of the search.
//!
//! The verdict compares the best fitness found in the first part of the run
//! with the best found in the last part of equal size. The comparison is
//! relative to the first-part best, so it reads the same for fitness values
//! in the hundreds or in the millions.

use std::fmt;

use tracing::debug;

use crate::{
    InsufficientDataError,
    config::{self, ConfigError},
    log::{EvaluationLog, fitness_of},
    stats,
};

/// Qualitative convergence state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConvergenceVerdict {
    /// The second half found a meaningfully better minimum.
    StillImproving,

    /// The second half did worse than the first by a meaningful margin.
    ConvergedEarly,

    /// The two halves' minima are within the plateau fraction of each other.
    LargelyConverged,
}

impl fmt::Display for ConvergenceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StillImproving => "still improving",
            Self::ConvergedEarly => "converged early",
            Self::LargelyConverged => "largely converged",
        })
    }
}

/// Configuration for the convergence analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceConfig {
    tail_window: usize,
    rolling_window: usize,
    half_window: usize,
    checkpoints: Vec<usize>,
    plateau_fraction: f64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            tail_window: 20,
            rolling_window: 10,
            half_window: 100,
            checkpoints: vec![50, 100, 150, 200],
            plateau_fraction: 0.02,
        }
    }
}

impl ConvergenceConfig {
    /// Sets the number of most recent evaluations averaged as the tail.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn with_tail_window(mut self, n: usize) -> Result<Self, ConfigError> {
        self.tail_window = config::window("tail window", n)?;
        Ok(self)
    }

    /// Sets the rolling-mean window for the fitness series.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn with_rolling_window(mut self, n: usize) -> Result<Self, ConfigError> {
        self.rolling_window = config::window("rolling window", n)?;
        Ok(self)
    }

    /// Sets the size of each half compared by the verdict on long logs.
    ///
    /// Logs shorter than twice this size are split down the middle instead.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn with_half_window(mut self, n: usize) -> Result<Self, ConfigError> {
        self.half_window = config::window("half window", n)?;
        Ok(self)
    }

    /// Sets the evaluation counts at which best-so-far is reported.
    #[must_use]
    pub fn with_checkpoints(mut self, checkpoints: impl IntoIterator<Item = usize>) -> Self {
        self.checkpoints = checkpoints.into_iter().collect();
        self
    }

    /// Sets the relative improvement below which a run counts as converged.
    ///
    /// # Errors
    ///
    /// Returns an error if the fraction is negative or non-finite.
    pub fn with_plateau_fraction(mut self, fraction: f64) -> Result<Self, ConfigError> {
        self.plateau_fraction = config::non_negative("plateau fraction", fraction)?;
        Ok(self)
    }

    #[must_use]
    pub fn tail_window(&self) -> usize {
        self.tail_window
    }

    #[must_use]
    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    #[must_use]
    pub fn half_window(&self) -> usize {
        self.half_window
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[usize] {
        &self.checkpoints
    }

    #[must_use]
    pub fn plateau_fraction(&self) -> f64 {
        self.plateau_fraction
    }

    /// Returns the size of each half compared for a log of `len` records.
    ///
    /// Never zero, so a single-record log compares the record with itself.
    #[must_use]
    pub fn split_size(&self, len: usize) -> usize {
        if len >= 2 * self.half_window {
            self.half_window
        } else {
            (len / 2).max(1)
        }
    }
}

/// The globally best evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BestEvaluation {
    pub eval: u64,
    pub fitness: f64,

    /// Position of the record in the log.
    pub position: usize,
}

/// Best-so-far fitness after a given number of evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Checkpoint {
    pub evaluations: usize,
    pub best_so_far: f64,
}

/// The head/tail comparison behind the verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HalfSplit {
    /// Number of records in each half.
    pub size: usize,
    pub first_best: f64,
    pub second_best: f64,

    /// `first_best - second_best`; positive when the second half did better.
    pub improvement: f64,
}

/// Output of the convergence analyzer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvergenceSummary {
    pub best: BestEvaluation,
    pub worst_fitness: f64,
    pub mean_fitness: f64,

    /// Mean fitness over the tail window.
    pub tail_mean_fitness: f64,

    /// Best fitness within the tail window.
    pub tail_best_fitness: f64,

    /// Best fitness within the window before the tail, when the log is
    /// longer than one tail window.
    pub previous_tail_best_fitness: Option<f64>,

    /// Checkpoints that fall within the log, in configured order.
    pub checkpoints: Vec<Checkpoint>,

    pub split: HalfSplit,
    pub verdict: ConvergenceVerdict,

    /// Cumulative minimum of fitness, one element per record.
    pub best_so_far: Vec<f64>,

    /// Rolling mean of fitness, one element per record.
    pub rolling_mean: Vec<f64>,
}

/// Applies the verdict rule to the best fitness of each half.
///
/// A change smaller than `plateau_fraction` of the first-half best (in
/// magnitude) is a plateau. Otherwise the sign of the change decides.
#[must_use]
pub fn verdict(first_best: f64, second_best: f64, plateau_fraction: f64) -> ConvergenceVerdict {
    let improvement = first_best - second_best;

    if improvement.abs() < plateau_fraction * first_best.abs() {
        ConvergenceVerdict::LargelyConverged
    } else if improvement > 0.0 {
        ConvergenceVerdict::StillImproving
    } else {
        ConvergenceVerdict::ConvergedEarly
    }
}

/// Analyzes the convergence of a run.
///
/// # Errors
///
/// Returns an [`InsufficientDataError`] if the log is empty.
pub fn analyze(
    log: &EvaluationLog,
    config: &ConvergenceConfig,
) -> Result<ConvergenceSummary, InsufficientDataError> {
    InsufficientDataError::check("convergence analysis", 1, log.len())?;

    let fitness = log.fitness();
    let best_record = log.best()?;
    let position = log
        .records()
        .iter()
        .position(|record| record.eval() == best_record.eval())
        .unwrap_or_default();

    let best_so_far = log.best_so_far();
    let checkpoints = config
        .checkpoints
        .iter()
        .filter(|&&n| n >= 1 && n <= log.len())
        .map(|&n| Checkpoint {
            evaluations: n,
            best_so_far: best_so_far[n - 1],
        })
        .collect();

    let tail = fitness_of(log.tail(config.tail_window));
    let previous_tail = {
        let end = log.len().saturating_sub(config.tail_window);
        let start = end.saturating_sub(config.tail_window);
        stats::min(&fitness[start..end])
    };

    let size = config.split_size(log.len());
    // Both halves are non-empty, unwraps are safe
    let first_best = stats::min(&fitness_of(log.head(size))).unwrap();
    let second_best = stats::min(&fitness_of(log.tail(size))).unwrap();
    let verdict = verdict(first_best, second_best, config.plateau_fraction);

    debug!(
        best_eval = best_record.eval(),
        best_fitness = best_record.fitness(),
        split = size,
        %verdict,
        "analyzed convergence"
    );

    // The log is non-empty, unwraps are safe
    Ok(ConvergenceSummary {
        best: BestEvaluation {
            eval: best_record.eval(),
            fitness: best_record.fitness(),
            position,
        },
        worst_fitness: stats::max(&fitness).unwrap(),
        mean_fitness: stats::mean(&fitness).unwrap(),
        tail_mean_fitness: stats::mean(&tail).unwrap(),
        tail_best_fitness: stats::min(&tail).unwrap(),
        previous_tail_best_fitness: previous_tail,
        checkpoints,
        split: HalfSplit {
            size,
            first_best,
            second_best,
            improvement: first_best - second_best,
        },
        verdict,
        best_so_far,
        rolling_mean: log.rolling_mean(config.rolling_window),
    })
}
