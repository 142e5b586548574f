//! Per-parameter convergence against declared bounds.
//!
//! Each parameter is judged on the most recent evaluations only. Its spread
//! in that window, normalized by the width of its bounds, places it in one of
//! three tiers:
//!
//! | normalized std     | tier        |
//! |--------------------|-------------|
//! | `< 0.10`           | converged   |
//! | `0.10 ..= 0.20`    | narrowing   |
//! | `> 0.20`           | exploring   |
//!
//! Independently, a window mean within 5% of the range from either bound
//! flags the parameter as hugging that bound, which usually means the bound
//! is constraining the search.

use std::fmt;

use tracing::debug;

use crate::{
    InsufficientDataError,
    config::{self, ConfigError},
    log::EvaluationLog,
    registry::{ParameterRegistry, ParameterSpec},
    stats,
};

/// How tightly a parameter has settled in the tail window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Spread {
    Converged,
    Narrowing,
    Exploring,
}

impl fmt::Display for Spread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Converged => "converged",
            Self::Narrowing => "narrowing",
            Self::Exploring => "exploring",
        })
    }
}

/// Whether a parameter's tail mean sits against one of its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BoundHug {
    #[default]
    None,
    HittingMin,
    HittingMax,
}

/// Combined convergence status of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterStatus {
    pub spread: Spread,
    pub bound: BoundHug,
}

impl ParameterStatus {
    #[must_use]
    pub fn is_hugging_bound(&self) -> bool {
        self.bound != BoundHug::None
    }
}

impl fmt::Display for ParameterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spread)?;
        match self.bound {
            BoundHug::None => Ok(()),
            BoundHug::HittingMin => f.write_str(" (hitting MIN)"),
            BoundHug::HittingMax => f.write_str(" (hitting MAX)"),
        }
    }
}

/// Configuration for the parameter classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    tail_window: usize,
    converged_below: f64,
    exploring_above: f64,
    bound_margin: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tail_window: 20,
            converged_below: 0.10,
            exploring_above: 0.20,
            bound_margin: 0.05,
        }
    }
}

impl ClassifierConfig {
    /// Sets the number of most recent evaluations inspected.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn with_tail_window(mut self, n: usize) -> Result<Self, ConfigError> {
        self.tail_window = config::window("tail window", n)?;
        Ok(self)
    }

    /// Sets the normalized-std thresholds between the three spread tiers.
    ///
    /// # Errors
    ///
    /// Returns an error if either threshold is negative or non-finite, or if
    /// `converged_below > exploring_above`.
    pub fn with_thresholds(
        mut self,
        converged_below: f64,
        exploring_above: f64,
    ) -> Result<Self, ConfigError> {
        let converged_below = config::non_negative("converged threshold", converged_below)?;
        let exploring_above = config::non_negative("exploring threshold", exploring_above)?;
        if converged_below > exploring_above {
            return Err(ConfigError::ThresholdOrder);
        }
        self.converged_below = converged_below;
        self.exploring_above = exploring_above;
        Ok(self)
    }

    /// Sets the bound margin as a fraction of the bound range.
    ///
    /// # Errors
    ///
    /// Returns an error if the fraction is outside `[0, 1]`.
    pub fn with_bound_margin(mut self, fraction: f64) -> Result<Self, ConfigError> {
        self.bound_margin = config::unit_interval("bound margin", fraction)?;
        Ok(self)
    }

    #[must_use]
    pub fn tail_window(&self) -> usize {
        self.tail_window
    }

    #[must_use]
    pub fn converged_below(&self) -> f64 {
        self.converged_below
    }

    #[must_use]
    pub fn exploring_above(&self) -> f64 {
        self.exploring_above
    }

    #[must_use]
    pub fn bound_margin(&self) -> f64 {
        self.bound_margin
    }

    /// Places a normalized standard deviation in its spread tier.
    #[must_use]
    pub fn spread(&self, norm_std: f64) -> Spread {
        if norm_std < self.converged_below {
            Spread::Converged
        } else if norm_std > self.exploring_above {
            Spread::Exploring
        } else {
            Spread::Narrowing
        }
    }

    /// Checks a tail mean against the bounds `[lower, upper]`.
    ///
    /// The lower bound is checked first, so it wins if a wide margin makes
    /// both checks pass.
    #[must_use]
    pub fn bound_hug(&self, mean: f64, lower: f64, upper: f64) -> BoundHug {
        let margin = self.bound_margin * (upper - lower);
        if mean <= lower + margin {
            BoundHug::HittingMin
        } else if mean >= upper - margin {
            BoundHug::HittingMax
        } else {
            BoundHug::None
        }
    }
}

/// Convergence row for one parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterConvergence {
    pub spec: ParameterSpec,

    /// Value at the globally best evaluation.
    pub best_value: f64,

    pub tail_mean: f64,

    /// Sample standard deviation over the tail window.
    pub tail_std: f64,

    /// `tail_std` divided by the bound range.
    pub norm_std: f64,

    pub status: ParameterStatus,

    /// Shift of the best value from the default, as a percentage of the
    /// range. Only set for designated new parameters.
    pub shift_from_default_pct: Option<f64>,
}

impl ParameterConvergence {
    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }
}

/// Divides a spread by a bound range, treating a degenerate range as zero
/// spread.
fn normalized_spread(std: f64, range: f64) -> f64 {
    if range > 0.0 { std / range } else { 0.0 }
}

/// Classifies every parameter present in both the log and the registry.
///
/// Rows follow registry declaration order.
///
/// # Errors
///
/// Returns an [`InsufficientDataError`] if the log is empty.
pub fn classify(
    log: &EvaluationLog,
    registry: &ParameterRegistry,
    config: &ClassifierConfig,
) -> Result<Vec<ParameterConvergence>, InsufficientDataError> {
    InsufficientDataError::check("parameter classification", 1, log.len())?;

    let best = log.best()?;
    let tail = log.tail(config.tail_window);

    let rows: Vec<ParameterConvergence> = log
        .parameter_names()
        .iter()
        .filter_map(|name| registry.spec_for(name).ok())
        .filter_map(|spec| {
            let window: Vec<f64> = tail
                .iter()
                .map(|record| record.parameter(spec.name()))
                .collect::<Option<_>>()?;
            let best_value = best.parameter(spec.name())?;

            // The tail is non-empty, unwraps are safe
            let tail_mean = stats::mean(&window).unwrap();
            let tail_std = stats::sample_std(&window).unwrap();
            let norm_std = normalized_spread(tail_std, spec.range());

            let status = ParameterStatus {
                spread: config.spread(norm_std),
                bound: config.bound_hug(tail_mean, spec.lower(), spec.upper()),
            };

            let shift_from_default_pct = registry.is_new(spec.name()).then(|| {
                normalized_spread(best_value - spec.default_value(), spec.range()) * 100.0
            });

            Some(ParameterConvergence {
                spec: spec.clone(),
                best_value,
                tail_mean,
                tail_std,
                norm_std,
                status,
                shift_from_default_pct,
            })
        })
        .collect();

    debug!(
        parameters = rows.len(),
        converged = rows.iter().filter(|r| r.status.spread == Spread::Converged).count(),
        hugging = rows.iter().filter(|r| r.status.is_hugging_bound()).count(),
        "classified parameters"
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::log::RawRow;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([
            ParameterSpec::new("unit", 0.0, 1.0, 0.5).unwrap(),
            ParameterSpec::new("wide", 0.0, 10.0, 5.0).unwrap(),
            ParameterSpec::new("unused", 0.0, 1.0, 0.5).unwrap(),
        ])
        .unwrap()
        .with_new_parameters(["wide"])
        .unwrap()
    }

    /// Builds a log with the given `(fitness, unit, wide)` rows.
    fn log(rows: &[(f64, f64, f64)]) -> EvaluationLog {
        let rows = (1_u64..).zip(rows).map(|(eval, &(fitness, unit, wide))| {
            RawRow::new()
                .with("eval", eval)
                .with("fitness", fitness)
                .with("unit", unit)
                .with("wide", wide)
        });
        EvaluationLog::load(rows, &registry()).unwrap()
    }

    fn row<'a>(rows: &'a [ParameterConvergence], name: &str) -> &'a ParameterConvergence {
        rows.iter().find(|r| r.name() == name).unwrap()
    }

    #[test]
    fn constant_tail_is_converged_without_hug() {
        let rows: Vec<_> = (0_i32..30)
            .map(|i| (-f64::from(i), 0.5, 5.0))
            .collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let unit = row(&result, "unit");
        assert_eq!(unit.tail_std, 0.0);
        assert_eq!(unit.norm_std, 0.0);
        assert_eq!(unit.status.spread, Spread::Converged);
        assert_eq!(unit.status.bound, BoundHug::None);
    }

    #[test]
    fn mean_near_lower_bound_is_hitting_min() {
        // Tail values alternate 0.1 and 0.5 around a mean of 0.3.
        let rows: Vec<_> = (0_i32..20)
            .map(|i| (-1.0, 0.5, if i % 2 == 0 { 0.1 } else { 0.5 }))
            .collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let wide = row(&result, "wide");
        assert_relative_eq!(wide.tail_mean, 0.3, epsilon = 1e-12);
        assert_eq!(wide.status.bound, BoundHug::HittingMin);
        assert_eq!(wide.status.spread, Spread::Converged);
    }

    #[test]
    fn bound_hug_is_independent_of_spread() {
        // Nineteen values at the lower bound and one near the upper bound:
        // mean 0.475 sits inside the 0.5 margin while the spread is wide.
        let rows: Vec<_> = (0_i32..20)
            .map(|i| (-1.0, 0.5, if i == 10 { 9.5 } else { 0.0 }))
            .collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let wide = row(&result, "wide");
        assert_relative_eq!(wide.tail_mean, 0.475, epsilon = 1e-12);
        assert!(wide.norm_std > 0.20);
        assert_eq!(wide.status.spread, Spread::Exploring);
        assert_eq!(wide.status.bound, BoundHug::HittingMin);
        assert_eq!(wide.status.to_string(), "exploring (hitting MIN)");
    }

    #[test]
    fn mean_near_upper_bound_is_hitting_max() {
        let rows: Vec<_> = (0_i32..5).map(|_| (-1.0, 0.97, 5.0)).collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        assert_eq!(row(&result, "unit").status.bound, BoundHug::HittingMax);
    }

    #[test]
    fn spread_tiers() {
        let config = ClassifierConfig::default();
        assert_eq!(config.spread(0.0), Spread::Converged);
        assert_eq!(config.spread(0.099), Spread::Converged);
        assert_eq!(config.spread(0.10), Spread::Narrowing);
        assert_eq!(config.spread(0.20), Spread::Narrowing);
        assert_eq!(config.spread(0.21), Spread::Exploring);
    }

    #[test]
    fn lower_bound_wins_when_margins_overlap() {
        let config = ClassifierConfig::default().with_bound_margin(0.6).unwrap();
        assert_eq!(config.bound_hug(0.5, 0.0, 1.0), BoundHug::HittingMin);
    }

    #[test]
    fn degenerate_range_has_zero_spread() {
        assert_eq!(normalized_spread(3.0, 0.0), 0.0);
        assert_eq!(normalized_spread(3.0, 6.0), 0.5);
    }

    #[test]
    fn wide_tail_is_exploring() {
        // Unit values spread across the whole range.
        let rows: Vec<_> = (0_i32..20)
            .map(|i| (-1.0, if i % 2 == 0 { 0.1 } else { 0.9 }, 5.0))
            .collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let unit = row(&result, "unit");
        assert!(unit.norm_std > 0.20);
        assert_eq!(unit.status.spread, Spread::Exploring);
        assert_eq!(unit.status.bound, BoundHug::None);
    }

    #[test]
    fn only_uses_the_tail_window() {
        // Early values wander, the last twenty are constant.
        let rows: Vec<_> = (0_i32..40)
            .map(|i| (-1.0, if i < 20 { f64::from(i) / 20.0 } else { 0.4 }, 5.0))
            .collect();
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        assert_eq!(row(&result, "unit").norm_std, 0.0);
    }

    #[test]
    fn best_value_and_shift_for_new_parameters() {
        let rows = [(-1.0, 0.2, 5.0), (-9.0, 0.8, 7.5), (-3.0, 0.4, 1.0)];
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let unit = row(&result, "unit");
        assert_eq!(unit.best_value, 0.8);
        assert_eq!(unit.shift_from_default_pct, None);

        let wide = row(&result, "wide");
        assert_eq!(wide.best_value, 7.5);
        assert_relative_eq!(wide.shift_from_default_pct.unwrap(), 25.0);
    }

    #[test]
    fn skips_parameters_absent_from_log() {
        let rows = [(-1.0, 0.2, 5.0)];
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        let names: Vec<_> = result.iter().map(ParameterConvergence::name).collect();
        assert_eq!(names, ["unit", "wide"]);
    }

    #[test]
    fn single_record_window_has_zero_std() {
        let rows = [(-1.0, 0.3, 5.0)];
        let result = classify(&log(&rows), &registry(), &ClassifierConfig::default()).unwrap();

        assert_eq!(row(&result, "unit").tail_std, 0.0);
    }

    #[test]
    fn empty_log_is_insufficient() {
        let result = classify(&log(&[]), &registry(), &ClassifierConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn status_display() {
        let status = ParameterStatus {
            spread: Spread::Narrowing,
            bound: BoundHug::HittingMax,
        };
        assert_eq!(status.to_string(), "narrowing (hitting MAX)");
    }

    #[test]
    fn rejects_inverted_thresholds() {
        assert_eq!(
            ClassifierConfig::default().with_thresholds(0.3, 0.2),
            Err(ConfigError::ThresholdOrder)
        );
    }
}
