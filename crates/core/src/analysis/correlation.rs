//! Parameter–fitness correlation.
//!
//! Fitness is minimized, so a negative correlation means larger parameter
//! values go with better runs.

use std::{cmp::Ordering, fmt};

use tracing::debug;

use crate::{
    InsufficientDataError,
    config::{self, ConfigError},
    log::{EvaluationLog, EvaluationRecord, fitness_of},
    stats,
};

/// Strength tier of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Significance {
    None,
    Weak,
    Moderate,
    Strong,
}

impl Significance {
    /// Tiers `|r|` as strong above 0.3, moderate above 0.2, weak above 0.1.
    ///
    /// `NaN` has no tier.
    #[must_use]
    pub fn of(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude > 0.3 {
            Self::Strong
        } else if magnitude > 0.2 {
            Self::Moderate
        } else if magnitude > 0.1 {
            Self::Weak
        } else {
            Self::None
        }
    }

    /// Short marker used in tabular output.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Strong => "***",
            Self::Moderate => "**",
            Self::Weak => "*",
            Self::None => "",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Configuration for the correlation analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationConfig {
    top_fraction: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { top_fraction: 0.2 }
    }
}

impl CorrelationConfig {
    /// Sets the fraction of best evaluations used for the focused correlation.
    ///
    /// # Errors
    ///
    /// Returns an error if the fraction is outside `[0, 1]`.
    pub fn with_top_fraction(mut self, fraction: f64) -> Result<Self, ConfigError> {
        self.top_fraction = config::unit_interval("top fraction", fraction)?;
        Ok(self)
    }

    #[must_use]
    pub fn top_fraction(&self) -> f64 {
        self.top_fraction
    }

    /// Number of best records in the focused subset of a log of `len`.
    #[must_use]
    pub fn top_count(&self, len: usize) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (self.top_fraction * len as f64).ceil() as usize;
        count.clamp(1, len.max(1))
    }
}

/// Correlation of one parameter with fitness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CorrelationEntry {
    pub parameter: String,

    /// Pearson r over the full log.
    pub all: f64,

    /// Pearson r over the best-fitness subset.
    pub top: f64,

    /// Tier of `all`.
    pub significance: Significance,
}

/// Ranked correlation rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CorrelationSummary {
    /// Size of the best-fitness subset.
    pub top_count: usize,

    /// Rows by descending `|all|`, `NaN` rows last.
    pub entries: Vec<CorrelationEntry>,
}

impl CorrelationSummary {
    #[must_use]
    pub fn get(&self, parameter: &str) -> Option<&CorrelationEntry> {
        self.entries.iter().find(|e| e.parameter == parameter)
    }

    /// Returns up to `n` entries with the largest positive `all`, strongest first.
    #[must_use]
    pub fn strongest_positive(&self, n: usize) -> Vec<&CorrelationEntry> {
        self.strongest(n, |e| e.all > 0.0, |a, b| b.all.total_cmp(&a.all))
    }

    /// Returns up to `n` entries with the most negative `all`, strongest first.
    #[must_use]
    pub fn strongest_negative(&self, n: usize) -> Vec<&CorrelationEntry> {
        self.strongest(n, |e| e.all < 0.0, |a, b| a.all.total_cmp(&b.all))
    }

    fn strongest(
        &self,
        n: usize,
        keep: impl Fn(&CorrelationEntry) -> bool,
        order: impl Fn(&CorrelationEntry, &CorrelationEntry) -> Ordering,
    ) -> Vec<&CorrelationEntry> {
        let mut picked: Vec<&CorrelationEntry> = self.entries.iter().filter(|e| keep(e)).collect();
        picked.sort_by(|a, b| order(a, b));
        picked.truncate(n);
        picked
    }
}

/// Orders by descending magnitude with `NaN` after every number.
fn by_magnitude(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.abs().total_cmp(&a.abs()),
    }
}

fn series<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>, name: &str) -> Vec<f64> {
    records
        .into_iter()
        .map(|record| record.parameter(name).unwrap_or(f64::NAN))
        .collect()
}

/// Correlates every parameter of the log with fitness.
///
/// Ties in magnitude keep the log's parameter order, which is registry
/// declaration order.
///
/// # Errors
///
/// Returns an [`InsufficientDataError`] if the log is empty.
pub fn correlate(
    log: &EvaluationLog,
    config: &CorrelationConfig,
) -> Result<CorrelationSummary, InsufficientDataError> {
    InsufficientDataError::check("correlation", 1, log.len())?;

    let top_count = config.top_count(log.len());
    let top = log.bottom_by_fitness(top_count);

    let fitness_all = log.fitness();
    let fitness_top = fitness_of(top.iter().copied());

    let mut entries: Vec<CorrelationEntry> = log
        .parameter_names()
        .iter()
        .map(|name| {
            let all = stats::pearson(&series(log.records(), name), &fitness_all);
            let top = stats::pearson(&series(top.iter().copied(), name), &fitness_top);
            CorrelationEntry {
                parameter: name.clone(),
                all,
                top,
                significance: Significance::of(all),
            }
        })
        .collect();

    // Stable, so equal magnitudes stay in declaration order.
    entries.sort_by(|a, b| by_magnitude(a.all, b.all));

    debug!(
        parameters = entries.len(),
        top_count,
        undefined = entries.iter().filter(|e| e.all.is_nan()).count(),
        "computed correlations"
    );

    Ok(CorrelationSummary { top_count, entries })
}
