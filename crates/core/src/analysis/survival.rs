//! Survival-duration estimates recovered from fitness.
//!
//! The simulation scores each run as
//!
//! ```text
//! fitness = -(ticks_survived * (1 + quality_weight * quality))
//! ```
//!
//! where `quality ∈ [0, 1]` is not logged. One equation cannot recover two
//! unknowns, so survival is reported as a point estimate at an assumed
//! quality (0.5 by default, giving a divisor of 1.1). Cap detection comes in
//! two tiers:
//!
//! - **likely**: `fitness <= -max_ticks`, which holds whenever the run hit
//!   the cap, whatever its quality.
//! - **definite**: `fitness <= -max_ticks * (1 + quality_weight)`, which can
//!   only be reached at the cap with maximal quality.
//!
//! Every definite hit is also a likely hit.

use tracing::debug;
use uom::si::{f64::Time, time::second};

use crate::{
    InsufficientDataError,
    config::{self, ConfigError},
    log::{EvaluationLog, EvaluationRecord},
    stats,
};

/// The reward formula and tick cap of the simulation being optimized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurvivalModel {
    max_ticks: u64,
    tick_duration: Time,
    quality_weight: f64,
    assumed_quality: f64,
    rolling_window: usize,
}

impl Default for SurvivalModel {
    fn default() -> Self {
        Self {
            max_ticks: 3_000_000,
            tick_duration: Time::new::<second>(1.0 / 60.0),
            quality_weight: 0.2,
            assumed_quality: 0.5,
            rolling_window: 10,
        }
    }
}

impl SurvivalModel {
    /// Sets the simulation's tick cap.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_ticks` is zero.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Result<Self, ConfigError> {
        if max_ticks == 0 {
            return Err(ConfigError::Positive("max ticks"));
        }
        self.max_ticks = max_ticks;
        Ok(self)
    }

    /// Sets the simulated time covered by one tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is not finite and strictly positive.
    pub fn with_tick_duration(mut self, tick_duration: Time) -> Result<Self, ConfigError> {
        config::positive("tick duration", tick_duration.get::<second>())?;
        self.tick_duration = tick_duration;
        Ok(self)
    }

    /// Sets the weight of quality in the fitness multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is not finite and strictly positive.
    pub fn with_quality_weight(mut self, weight: f64) -> Result<Self, ConfigError> {
        self.quality_weight = config::positive("quality weight", weight)?;
        Ok(self)
    }

    /// Sets the quality assumed when estimating survival ticks.
    ///
    /// # Errors
    ///
    /// Returns an error if the quality is outside `[0, 1]`.
    pub fn with_assumed_quality(mut self, quality: f64) -> Result<Self, ConfigError> {
        self.assumed_quality = config::unit_interval("assumed quality", quality)?;
        Ok(self)
    }

    /// Sets the rolling-mean window for the survival series.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero.
    pub fn with_rolling_window(mut self, n: usize) -> Result<Self, ConfigError> {
        self.rolling_window = config::window("rolling window", n)?;
        Ok(self)
    }

    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    #[must_use]
    pub fn tick_duration(&self) -> Time {
        self.tick_duration
    }

    #[must_use]
    pub fn quality_weight(&self) -> f64 {
        self.quality_weight
    }

    #[must_use]
    pub fn assumed_quality(&self) -> f64 {
        self.assumed_quality
    }

    #[must_use]
    pub fn rolling_window(&self) -> usize {
        self.rolling_window
    }

    #[allow(clippy::cast_precision_loss)]
    fn cap(&self) -> f64 {
        self.max_ticks as f64
    }

    /// Returns the simulated duration of a run that hits the cap.
    #[must_use]
    pub fn cap_duration(&self) -> Time {
        self.tick_duration * self.cap()
    }

    /// Returns the fitness divisor used for point estimates (1.1 by default).
    #[must_use]
    pub fn estimate_multiplier(&self) -> f64 {
        1.0 + self.quality_weight * self.assumed_quality
    }

    /// Estimates survival ticks from fitness at the assumed quality.
    #[must_use]
    pub fn ticks(&self, fitness: f64) -> f64 {
        -fitness / self.estimate_multiplier()
    }

    /// Estimates the simulated survival duration from fitness.
    #[must_use]
    pub fn duration(&self, fitness: f64) -> Time {
        self.tick_duration * self.ticks(fitness)
    }

    /// Returns `true` if the fitness is consistent with hitting the cap at
    /// any quality.
    #[must_use]
    pub fn likely_hit_cap(&self, fitness: f64) -> bool {
        fitness <= -self.cap()
    }

    /// Returns `true` if the fitness requires hitting the cap at maximal
    /// quality.
    #[must_use]
    pub fn definitely_hit_cap(&self, fitness: f64) -> bool {
        fitness <= -self.cap() * (1.0 + self.quality_weight)
    }

    /// Solves for quality assuming the run survived exactly to the cap.
    ///
    /// Returns `None` when the fitness does not reach the cap. The result is
    /// clamped to `[0, 1]`.
    #[must_use]
    pub fn implied_quality(&self, fitness: f64) -> Option<f64> {
        let scaled = -fitness / self.cap();
        (scaled >= 1.0).then(|| ((scaled - 1.0) / self.quality_weight).clamp(0.0, 1.0))
    }

    /// Builds the estimate for one record.
    #[must_use]
    pub fn estimate(&self, record: &EvaluationRecord) -> SurvivalEstimate {
        let fitness = record.fitness();
        SurvivalEstimate {
            eval: record.eval(),
            ticks: self.ticks(fitness),
            duration: self.duration(fitness),
            likely_hit_cap: self.likely_hit_cap(fitness),
            definitely_hit_cap: self.definitely_hit_cap(fitness),
        }
    }
}

/// Estimated survival of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SurvivalEstimate {
    pub eval: u64,
    pub ticks: f64,
    pub duration: Time,
    pub likely_hit_cap: bool,
    pub definitely_hit_cap: bool,
}

/// Survival over one contiguous quarter of the log.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuarterSummary {
    pub first_eval: u64,
    pub last_eval: u64,
    pub count: usize,
    pub mean_duration: Time,

    /// Records in the quarter that likely hit the cap.
    pub cap_hits: usize,
}

impl QuarterSummary {
    /// Returns the fraction of records in the quarter that likely hit the cap.
    #[must_use]
    pub fn cap_hit_rate(&self) -> f64 {
        ratio(self.cap_hits, self.count)
    }
}

/// What the best fitness implies about the best run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BestOutcome {
    /// The run reached the cap; quality solved from the fitness surplus.
    HitCap { quality: f64 },

    /// The run ended before the cap; survival estimated at assumed quality.
    Survived { ticks: f64, duration: Time },
}

/// Output of the survival estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SurvivalSummary {
    pub cap_duration: Time,

    /// One estimate per record, in evaluation order.
    pub estimates: Vec<SurvivalEstimate>,

    /// Rolling mean of estimated duration, one element per record.
    pub rolling_duration: Vec<Time>,

    pub mean_duration: Time,
    pub median_duration: Time,
    pub min_duration: Time,
    pub max_duration: Time,

    pub likely_cap_hits: usize,
    pub definite_cap_hits: usize,

    pub quarters: Vec<QuarterSummary>,
    pub best_outcome: BestOutcome,
}

impl SurvivalSummary {
    /// Fraction of all records that likely hit the cap.
    #[must_use]
    pub fn likely_cap_rate(&self) -> f64 {
        ratio(self.likely_cap_hits, self.estimates.len())
    }

    /// Fraction of all records that definitely hit the cap.
    #[must_use]
    pub fn definite_cap_rate(&self) -> f64 {
        ratio(self.definite_cap_hits, self.estimates.len())
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Returns the sizes of the positional quarters of a log of `len` records.
///
/// A log of at least four records always splits into four quarters whose
/// sizes differ by at most one, with the longer quarters first. Shorter logs
/// get one single-record quarter per record.
#[must_use]
pub fn quarter_sizes(len: usize) -> Vec<usize> {
    let quarters = len.min(4);
    (0..quarters)
        .map(|i| len / quarters + usize::from(i < len % quarters))
        .collect()
}

/// Estimates survival for every record and summarizes the run.
///
/// # Errors
///
/// Returns an [`InsufficientDataError`] if the log is empty.
pub fn estimate(
    log: &EvaluationLog,
    model: &SurvivalModel,
) -> Result<SurvivalSummary, InsufficientDataError> {
    InsufficientDataError::check("survival estimation", 1, log.len())?;

    let estimates: Vec<SurvivalEstimate> =
        log.records().iter().map(|r| model.estimate(r)).collect();
    let seconds: Vec<f64> = estimates.iter().map(|e| e.duration.get::<second>()).collect();

    let mut rest = estimates.as_slice();
    let quarters = quarter_sizes(estimates.len())
        .into_iter()
        .map(|size| {
            let (quarter, tail) = rest.split_at(size);
            rest = tail;
            summarize_quarter(quarter)
        })
        .collect();

    let best_fitness = log.best()?.fitness();
    let best_outcome = match model.implied_quality(best_fitness) {
        Some(quality) => BestOutcome::HitCap { quality },
        None => BestOutcome::Survived {
            ticks: model.ticks(best_fitness),
            duration: model.duration(best_fitness),
        },
    };

    let likely_cap_hits = estimates.iter().filter(|e| e.likely_hit_cap).count();
    let definite_cap_hits = estimates.iter().filter(|e| e.definitely_hit_cap).count();

    debug!(
        records = estimates.len(),
        likely_cap_hits, definite_cap_hits, "estimated survival"
    );

    let time = |s: f64| Time::new::<second>(s);

    // The log is non-empty, unwraps are safe
    Ok(SurvivalSummary {
        cap_duration: model.cap_duration(),
        rolling_duration: stats::rolling_mean(&seconds, model.rolling_window)
            .into_iter()
            .map(time)
            .collect(),
        mean_duration: time(stats::mean(&seconds).unwrap()),
        median_duration: time(stats::median(&seconds).unwrap()),
        min_duration: time(stats::min(&seconds).unwrap()),
        max_duration: time(stats::max(&seconds).unwrap()),
        likely_cap_hits,
        definite_cap_hits,
        quarters,
        best_outcome,
        estimates,
    })
}

fn summarize_quarter(quarter: &[SurvivalEstimate]) -> QuarterSummary {
    let seconds: Vec<f64> = quarter.iter().map(|e| e.duration.get::<second>()).collect();

    // Quarters are never empty, unwraps are safe
    QuarterSummary {
        first_eval: quarter.first().unwrap().eval,
        last_eval: quarter.last().unwrap().eval,
        count: quarter.len(),
        mean_duration: Time::new::<second>(stats::mean(&seconds).unwrap()),
        cap_hits: quarter.iter().filter(|e| e.likely_hit_cap).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{log::RawRow, registry::ParameterRegistry};

    fn fitness_log(fitness: impl IntoIterator<Item = f64>) -> EvaluationLog {
        let rows = (1_u64..)
            .zip(fitness)
            .map(|(eval, f)| RawRow::new().with("eval", eval).with("fitness", f));
        EvaluationLog::load(rows, &ParameterRegistry::default()).unwrap()
    }

    fn model(max_ticks: u64) -> SurvivalModel {
        SurvivalModel::default().with_max_ticks(max_ticks).unwrap()
    }

    #[test]
    fn default_multiplier_is_midpoint() {
        assert_relative_eq!(SurvivalModel::default().estimate_multiplier(), 1.1);
    }

    #[test]
    fn scenario_three_evaluations() {
        let log = fitness_log([-100.0, -150.0, -90.0]);
        let summary = estimate(&log, &model(1000)).unwrap();

        assert!(summary.estimates.iter().all(|e| !e.likely_hit_cap));
        assert_eq!(summary.likely_cap_hits, 0);
        assert_relative_eq!(summary.estimates[1].ticks, 150.0 / 1.1);
        assert_relative_eq!(summary.estimates[1].ticks, 136.36, epsilon = 0.01);

        match summary.best_outcome {
            BestOutcome::Survived { ticks, duration } => {
                assert_relative_eq!(ticks, 150.0 / 1.1);
                assert_relative_eq!(duration.get::<second>(), 150.0 / 1.1 / 60.0, epsilon = 1e-12);
            }
            BestOutcome::HitCap { .. } => panic!("best run did not reach the cap"),
        }
    }

    #[test]
    fn cap_tiers_are_nested() {
        let model = model(1000);

        for fitness in [-1300.0, -1200.0, -1100.0, -1000.0, -999.0, 0.0] {
            if model.definitely_hit_cap(fitness) {
                assert!(model.likely_hit_cap(fitness));
            }
            if model.likely_hit_cap(fitness) {
                assert!(fitness <= -1000.0);
            }
        }

        assert!(model.likely_hit_cap(-1000.0));
        assert!(!model.definitely_hit_cap(-1100.0));
        assert!(model.definitely_hit_cap(-1200.0));
    }

    #[test]
    fn implied_quality_is_solved_and_clamped() {
        let model = model(1000);

        assert_eq!(model.implied_quality(-999.0), None);
        assert_relative_eq!(model.implied_quality(-1000.0).unwrap(), 0.0);
        assert_relative_eq!(model.implied_quality(-1100.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(model.implied_quality(-5000.0).unwrap(), 1.0);
    }

    #[test]
    fn best_outcome_reports_quality_at_cap() {
        let log = fitness_log([-500.0, -1150.0]);
        let summary = estimate(&log, &model(1000)).unwrap();

        match summary.best_outcome {
            BestOutcome::HitCap { quality } => assert_relative_eq!(quality, 0.75, epsilon = 1e-12),
            BestOutcome::Survived { .. } => panic!("best run reached the cap"),
        }
        assert_eq!(summary.likely_cap_hits, 1);
        assert_relative_eq!(summary.likely_cap_rate(), 0.5);
    }

    #[test]
    fn quarters_are_positional() {
        let fitness = (0..10).map(|i| if i >= 7 { -2000.0 } else { -110.0 });
        let log = fitness_log(fitness);
        let summary = estimate(&log, &model(1000)).unwrap();

        // Quarters of 3, 3, 2, 2.
        let counts: Vec<_> = summary.quarters.iter().map(|q| q.count).collect();
        assert_eq!(counts, [3, 3, 2, 2]);
        assert_eq!(summary.quarters[2].first_eval, 7);
        assert_eq!(summary.quarters[2].last_eval, 8);
        assert_eq!(summary.quarters[2].cap_hits, 1);
        assert_relative_eq!(summary.quarters[2].cap_hit_rate(), 0.5);
        assert_eq!(summary.quarters[3].first_eval, 9);
        assert_relative_eq!(summary.quarters[3].cap_hit_rate(), 1.0);
        assert_relative_eq!(summary.quarters[0].cap_hit_rate(), 0.0);
        assert_relative_eq!(
            summary.quarters[0].mean_duration.get::<second>(),
            100.0 / 60.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn four_or_more_records_make_four_quarters() {
        assert_eq!(quarter_sizes(4), [1, 1, 1, 1]);
        assert_eq!(quarter_sizes(5), [2, 1, 1, 1]);
        assert_eq!(quarter_sizes(6), [2, 2, 1, 1]);
        assert_eq!(quarter_sizes(9), [3, 2, 2, 2]);
        assert_eq!(quarter_sizes(200), [50, 50, 50, 50]);

        for len in 4..40 {
            let sizes = quarter_sizes(len);
            assert_eq!(sizes.len(), 4);
            assert_eq!(sizes.iter().sum::<usize>(), len);
        }

        let log = fitness_log((1_i32..=9).map(|i| -f64::from(i)));
        let summary = estimate(&log, &model(1000)).unwrap();
        let bounds: Vec<_> = summary
            .quarters
            .iter()
            .map(|q| (q.first_eval, q.last_eval))
            .collect();
        assert_eq!(bounds, [(1, 3), (4, 5), (6, 7), (8, 9)]);
    }

    #[test]
    fn short_logs_have_one_quarter_per_record() {
        assert!(quarter_sizes(0).is_empty());
        assert_eq!(quarter_sizes(1), [1]);
        assert_eq!(quarter_sizes(3), [1, 1, 1]);

        let log = fitness_log([-1.0, -2.0]);
        let summary = estimate(&log, &model(1000)).unwrap();
        assert_eq!(summary.quarters.len(), 2);
    }

    #[test]
    fn duration_statistics() {
        let log = fitness_log([-66.0, -132.0, -198.0]);
        let summary = estimate(&log, &model(1000)).unwrap();

        // 60, 120, 180 ticks at 60 ticks per second.
        assert_relative_eq!(summary.min_duration.get::<second>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(summary.median_duration.get::<second>(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(summary.max_duration.get::<second>(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(summary.mean_duration.get::<second>(), 2.0, epsilon = 1e-12);
        assert_eq!(summary.rolling_duration.len(), 3);
    }

    #[test]
    fn empty_log_is_insufficient() {
        let log = fitness_log([]);
        assert!(estimate(&log, &SurvivalModel::default()).is_err());
    }

    #[test]
    fn rejects_invalid_model() {
        assert!(SurvivalModel::default().with_max_ticks(0).is_err());
        assert!(SurvivalModel::default().with_quality_weight(0.0).is_err());
        assert!(SurvivalModel::default().with_assumed_quality(1.5).is_err());
        assert!(
            SurvivalModel::default()
                .with_tick_duration(Time::new::<second>(-1.0))
                .is_err()
        );
    }
}
