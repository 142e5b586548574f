use thiserror::Error;

use crate::analysis::{
    convergence::ConvergenceConfig, correlation::CorrelationConfig,
    parameters::ClassifierConfig, survival::SurvivalModel,
};

/// Errors that can occur when validating an analysis configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be finite and non-negative")]
    NonNegative(&'static str),

    #[error("{0} must be finite and strictly positive")]
    Positive(&'static str),

    #[error("{0} must be at least one")]
    ZeroWindow(&'static str),

    #[error("{0} must lie in [0, 1]")]
    UnitInterval(&'static str),

    #[error("converged threshold must not exceed exploring threshold")]
    ThresholdOrder,
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonNegative(name))
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Positive(name))
    }
}

pub(crate) fn unit_interval(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::UnitInterval(name))
    }
}

pub(crate) fn window(name: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroWindow(name))
    } else {
        Ok(value)
    }
}

/// Configuration for a full analysis run.
///
/// Groups the per-analyzer configurations. The default reproduces the
/// thresholds and windows of the exp10 analysis: a 20-evaluation tail, a
/// 10-evaluation rolling window, a 3,000,000 tick cap at 60 ticks per second,
/// and the top 20% of evaluations for the focused correlation.
///
/// # Example
///
/// ```
/// use hindsight_core::{Config, analysis::survival::SurvivalModel};
///
/// let survival = SurvivalModel::default().with_max_ticks(1_000).unwrap();
/// let config = Config::default().with_survival(survival);
///
/// assert_eq!(config.survival().max_ticks(), 1_000);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    convergence: ConvergenceConfig,
    survival: SurvivalModel,
    classifier: ClassifierConfig,
    correlation: CorrelationConfig,
}

impl Config {
    #[must_use]
    pub fn with_convergence(mut self, convergence: ConvergenceConfig) -> Self {
        self.convergence = convergence;
        self
    }

    #[must_use]
    pub fn with_survival(mut self, survival: SurvivalModel) -> Self {
        self.survival = survival;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_correlation(mut self, correlation: CorrelationConfig) -> Self {
        self.correlation = correlation;
        self
    }

    #[must_use]
    pub fn convergence(&self) -> &ConvergenceConfig {
        &self.convergence
    }

    #[must_use]
    pub fn survival(&self) -> &SurvivalModel {
        &self.survival
    }

    #[must_use]
    pub fn classifier(&self) -> &ClassifierConfig {
        &self.classifier
    }

    #[must_use]
    pub fn correlation(&self) -> &CorrelationConfig {
        &self.correlation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_reject_bad_values() {
        assert_eq!(non_negative("x", -0.1), Err(ConfigError::NonNegative("x")));
        assert_eq!(non_negative("x", f64::NAN), Err(ConfigError::NonNegative("x")));
        assert_eq!(non_negative("x", 0.0), Ok(0.0));

        assert_eq!(positive("x", 0.0), Err(ConfigError::Positive("x")));
        assert_eq!(positive("x", f64::INFINITY), Err(ConfigError::Positive("x")));

        assert_eq!(unit_interval("x", 1.5), Err(ConfigError::UnitInterval("x")));
        assert_eq!(unit_interval("x", f64::NAN), Err(ConfigError::UnitInterval("x")));
        assert_eq!(unit_interval("x", 1.0), Ok(1.0));

        assert_eq!(window("x", 0), Err(ConfigError::ZeroWindow("x")));
        assert_eq!(window("x", 3), Ok(3));
    }
}
