use approx::assert_relative_eq;
use hindsight_core::{
    Config, Pipeline,
    analysis::{
        convergence::ConvergenceVerdict,
        parameters::{BoundHug, Spread},
        survival::{BestOutcome, SurvivalModel},
    },
    log::RawRow,
    registry::{ParameterRegistry, ParameterSpec},
};

fn row(eval: u64, fitness: f64) -> RawRow {
    RawRow::new().with("eval", eval).with("fitness", fitness)
}

#[test]
fn three_evaluation_scenario() {
    let survival = SurvivalModel::default().with_max_ticks(1_000).unwrap();
    let pipeline = Pipeline::new(
        ParameterRegistry::default(),
        Config::default().with_survival(survival),
    );

    let report = pipeline
        .run([row(1, -100.0), row(2, -150.0), row(3, -90.0)])
        .unwrap();

    assert_eq!(report.convergence.best.eval, 2);
    assert_eq!(report.convergence.best_so_far, [-100.0, -150.0, -150.0]);
    assert_eq!(report.survival.likely_cap_hits, 0);
    assert_eq!(report.survival.definite_cap_hits, 0);
    assert_relative_eq!(report.survival.estimates[1].ticks, 136.36, epsilon = 0.01);

    let BestOutcome::Survived { ticks, .. } = report.survival.best_outcome else {
        panic!("best run should not have hit the cap");
    };
    assert_relative_eq!(ticks, 150.0 / 1.1);
    assert!(report.parameters.is_empty());
    assert!(report.correlations.entries.is_empty());
}

/// A 300-evaluation run over the exp10 registry where fitness keeps
/// improving, `pred_move_cost` settles at its lower bound and
/// `carcass_fraction` never varies.
fn exp10_rows() -> Vec<RawRow> {
    let registry = ParameterRegistry::exp10();
    (1_u32..=300)
        .map(|eval| {
            let t = f64::from(eval);
            let mut row = RawRow::new()
                .with("eval", eval)
                .with("fitness", -1_000.0 * t - 50.0 * (t * 0.7).sin());

            for spec in registry.specs() {
                let value = match spec.name() {
                    "pred_move_cost" => {
                        spec.lower() + spec.range() * 0.01 * (t * 1.3).sin().abs()
                    }
                    "carcass_fraction" => spec.default_value(),
                    _ => spec.lower() + spec.range() * (0.5 + 0.4 * (t * 0.37).sin()),
                };
                row.insert(spec.name(), value);
            }
            row
        })
        .collect()
}

#[test]
fn exp10_run_end_to_end() {
    let pipeline = Pipeline::new(ParameterRegistry::exp10(), Config::default());
    let report = pipeline.run(exp10_rows()).unwrap();

    assert_eq!(report.evaluations, 300);
    assert_eq!(report.convergence.split.size, 100);
    assert_eq!(report.convergence.verdict, ConvergenceVerdict::StillImproving);
    assert_eq!(report.convergence.checkpoints.len(), 4);
    assert!(report.convergence.previous_tail_best_fitness.is_some());
    assert_eq!(report.survival.quarters.len(), 4);

    assert_eq!(report.parameters.len(), 25);
    assert_eq!(report.best_configuration.len(), 25);

    let pred_move_cost = report.parameter("pred_move_cost").unwrap();
    assert_eq!(pred_move_cost.status.spread, Spread::Converged);
    assert_eq!(pred_move_cost.status.bound, BoundHug::HittingMin);

    let carcass = report.parameter("carcass_fraction").unwrap();
    assert_eq!(carcass.norm_std, 0.0);
    assert!(carcass.shift_from_default_pct.is_some());

    let carcass_corr = report.correlations.get("carcass_fraction").unwrap();
    assert!(carcass_corr.all.is_nan());
    assert!(carcass_corr.top.is_nan());
    assert_eq!(
        report.correlations.entries.last().unwrap().parameter,
        "carcass_fraction"
    );

    assert_eq!(report.new_parameter_rows().len(), 7);
    assert!(report.hugging_bounds().any(|p| p.name() == "pred_move_cost"));
}

#[test]
fn reports_are_reproducible() {
    let pipeline = Pipeline::new(ParameterRegistry::exp10(), Config::default());

    let first = pipeline.run(exp10_rows()).unwrap();
    let second = pipeline.run(exp10_rows()).unwrap();

    // NaN correlations defeat PartialEq, so compare the full debug output.
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn best_so_far_is_running_minimum() {
    let pipeline = Pipeline::new(ParameterRegistry::exp10(), Config::default());
    let log = pipeline.load(exp10_rows()).unwrap();
    let report = pipeline.analyze(&log).unwrap();

    let fitness = log.fitness();
    let best = &report.convergence.best_so_far;
    assert_eq!(best.len(), fitness.len());
    assert!(best.windows(2).all(|w| w[1] <= w[0]));
    for (i, value) in best.iter().enumerate() {
        let min = fitness[..=i].iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(*value, min);
    }

    let rolling = &report.convergence.rolling_mean;
    assert_eq!(rolling.len(), fitness.len());
    assert_eq!(rolling[0], fitness[0]);
}

#[test]
fn bounds_scenarios() {
    let registry = ParameterRegistry::new([
        ParameterSpec::new("unit", 0.0, 1.0, 0.5).unwrap(),
        ParameterSpec::new("wide", 0.0, 10.0, 5.0).unwrap(),
    ])
    .unwrap();
    let pipeline = Pipeline::new(registry, Config::default());

    let rows = (1_u64..=20).map(|eval| {
        row(eval, -1.0)
            .with("unit", 0.5)
            .with("wide", if eval % 2 == 0 { 0.1 } else { 0.5 })
    });
    let report = pipeline.run(rows).unwrap();

    let unit = report.parameter("unit").unwrap();
    assert_eq!(unit.tail_std, 0.0);
    assert_eq!(unit.norm_std, 0.0);
    assert_eq!(unit.status.spread, Spread::Converged);
    assert_eq!(unit.status.bound, BoundHug::None);

    let wide = report.parameter("wide").unwrap();
    assert_relative_eq!(wide.tail_mean, 0.3, epsilon = 1e-12);
    assert_eq!(wide.status.bound, BoundHug::HittingMin);
}

#[test]
fn cap_hits_are_detected() {
    let survival = SurvivalModel::default().with_max_ticks(1_000).unwrap();
    let pipeline = Pipeline::new(
        ParameterRegistry::default(),
        Config::default().with_survival(survival),
    );

    let report = pipeline
        .run([row(1, -500.0), row(2, -1_050.0), row(3, -1_200.0)])
        .unwrap();

    assert_eq!(report.survival.likely_cap_hits, 2);
    assert_eq!(report.survival.definite_cap_hits, 1);
    for estimate in &report.survival.estimates {
        assert!(!estimate.definitely_hit_cap || estimate.likely_hit_cap);
    }

    let BestOutcome::HitCap { quality } = report.survival.best_outcome else {
        panic!("best run should have hit the cap");
    };
    assert_relative_eq!(quality, 1.0, epsilon = 1e-12);
}
