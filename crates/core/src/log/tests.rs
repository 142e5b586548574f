use crate::registry::{ParameterRegistry, ParameterSpec};

use super::{EvaluationLog, HEADER_ROW, LoadError, RawRow};

fn registry() -> ParameterRegistry {
    ParameterRegistry::new([
        ParameterSpec::new("alpha", 0.0, 1.0, 0.5).unwrap(),
        ParameterSpec::new("beta", 0.0, 10.0, 5.0).unwrap(),
    ])
    .unwrap()
}

fn row(eval: u64, fitness: f64) -> RawRow {
    RawRow::new().with("eval", eval).with("fitness", fitness)
}

fn fitness_log(fitness: &[f64]) -> EvaluationLog {
    let rows = (1..).zip(fitness).map(|(eval, &f)| row(eval, f));
    EvaluationLog::load(rows, &registry()).unwrap()
}

#[test]
fn loads_rows_with_parameters() {
    let rows = [
        row(1, -100.0).with("alpha", 0.25).with("beta", 3.0),
        row(2, -150.0).with("alpha", 0.75).with("beta", 7.0),
    ];

    let log = EvaluationLog::load(rows, &registry()).unwrap();

    assert_eq!(log.len(), 2);
    assert_eq!(log.parameter_names(), ["alpha", "beta"]);
    assert_eq!(log.records()[1].parameter("alpha"), Some(0.75));
    assert_eq!(log.parameter_series("beta"), Some(vec![3.0, 7.0]));
    assert_eq!(log.parameter_series("gamma"), None);
}

#[test]
fn empty_input_is_a_valid_empty_log() {
    let log = EvaluationLog::load([], &registry()).unwrap();

    assert!(log.is_empty());
    assert!(log.best_so_far().is_empty());
    assert!(log.best().is_err());
}

#[test]
fn missing_required_column_fails() {
    let rows = [RawRow::new().with("eval", 1).with("alpha", 0.5)];

    assert_eq!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::MissingColumn {
            row: 1,
            column: "fitness".into()
        })
    );
}

#[test]
fn missing_column_is_reported_before_unknown_parameter() {
    let rows = [
        row(1, -1.0).with("gamma", 1.0),
        RawRow::new().with("fitness", -2.0),
    ];

    assert!(matches!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::MissingColumn { row: 2, .. })
    ));
}

#[test]
fn unknown_parameter_column_fails() {
    let rows = [row(1, -1.0).with("gamma", 1.0)];

    let err = EvaluationLog::load(rows, &registry()).unwrap_err();
    match err {
        LoadError::UnknownParameter(e) => assert_eq!(e.name, "gamma"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_parameter_is_reported_before_malformed_value() {
    let rows = [RawRow::new()
        .with("eval", 1)
        .with("fitness", "oops")
        .with("gamma", 1.0)];

    assert!(matches!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::UnknownParameter(ref e)) if e.name == "gamma"
    ));
}

#[test]
fn header_without_rows_is_validated() {
    assert_eq!(
        EvaluationLog::load_with_columns(["eval", "gamma"], [], &registry()),
        Err(LoadError::MissingColumn {
            row: HEADER_ROW,
            column: "fitness".into()
        })
    );

    assert!(matches!(
        EvaluationLog::load_with_columns(["eval", "fitness", "gamma"], [], &registry()),
        Err(LoadError::UnknownParameter(ref e)) if e.name == "gamma"
    ));

    let log = EvaluationLog::load_with_columns(["eval", "fitness", "beta"], [], &registry());
    assert!(log.unwrap().is_empty());
}

#[test]
fn header_errors_name_the_header() {
    let err = EvaluationLog::load_with_columns(["fitness"], [], &registry()).unwrap_err();
    assert_eq!(err.to_string(), "header is missing column `eval`");

    let rows = [RawRow::new().with("eval", 1)];
    let err = EvaluationLog::load(rows, &registry()).unwrap_err();
    assert_eq!(err.to_string(), "row 1 is missing column `fitness`");
}

#[test]
fn rows_are_checked_after_the_header() {
    let rows = [row(1, -1.0).with("alpha", "abc")];

    assert!(matches!(
        EvaluationLog::load_with_columns(["eval", "fitness", "alpha"], rows, &registry()),
        Err(LoadError::MalformedValue { ref column, .. }) if column == "alpha"
    ));
}

#[test]
fn declared_parameters_may_be_absent_from_the_log() {
    let rows = [row(1, -1.0).with("beta", 2.0)];

    let log = EvaluationLog::load(rows, &registry()).unwrap();
    assert_eq!(log.parameter_names(), ["beta"]);
}

#[test]
fn rows_must_share_parameter_columns() {
    let rows = [
        row(1, -1.0).with("alpha", 0.1).with("beta", 2.0),
        row(2, -2.0).with("beta", 2.0),
    ];

    assert_eq!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::MissingColumn {
            row: 2,
            column: "alpha".into()
        })
    );
}

#[test]
fn non_numeric_and_non_finite_values_fail() {
    for bad in ["abc", "", "NaN", "inf"] {
        let rows = [row(1, -1.0).with("alpha", bad)];
        assert!(
            matches!(
                EvaluationLog::load(rows, &registry()),
                Err(LoadError::MalformedValue { ref column, .. }) if column == "alpha"
            ),
            "value {bad:?} should be rejected"
        );
    }
}

#[test]
fn eval_accepts_integral_floats_only() {
    let ok = [RawRow::new().with("eval", "3.0").with("fitness", -1.0)];
    assert_eq!(
        EvaluationLog::load(ok, &registry()).unwrap().records()[0].eval(),
        3
    );

    let largest = [RawRow::new().with("eval", u64::MAX).with("fitness", -1.0)];
    assert_eq!(
        EvaluationLog::load(largest, &registry()).unwrap().records()[0].eval(),
        u64::MAX
    );

    for bad in ["2.5", "-1", "x", "0", "0.0", "-0", "1e20", "18446744073709551616"] {
        let rows = [RawRow::new().with("eval", bad).with("fitness", -1.0)];
        assert!(
            matches!(
                EvaluationLog::load(rows, &registry()),
                Err(LoadError::MalformedValue { ref column, .. }) if column == "eval"
            ),
            "eval {bad:?} should be rejected"
        );
    }
}

#[test]
fn out_of_range_evals_are_not_duplicates() {
    let rows = [
        RawRow::new().with("eval", "1e20").with("fitness", -1.0),
        RawRow::new().with("eval", "2e20").with("fitness", -2.0),
    ];

    assert_eq!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::MalformedValue {
            row: 1,
            column: "eval".into(),
            value: "1e20".into()
        })
    );
}

#[test]
fn duplicate_eval_fails() {
    let rows = [row(1, -1.0), row(2, -2.0), row(1, -3.0)];

    assert_eq!(
        EvaluationLog::load(rows, &registry()),
        Err(LoadError::DuplicateEval(1))
    );
}

#[test]
fn rows_are_sorted_by_eval() {
    let rows = [row(3, -3.0), row(1, -1.0), row(2, -2.0)];

    let log = EvaluationLog::load(rows, &registry()).unwrap();
    assert_eq!(log.evals(), [1, 2, 3]);
    assert_eq!(log.fitness(), [-1.0, -2.0, -3.0]);
}

#[test]
fn best_so_far_is_cumulative_minimum() {
    let log = fitness_log(&[-100.0, -150.0, -90.0]);
    assert_eq!(log.best_so_far(), [-100.0, -150.0, -150.0]);
}

#[test]
fn best_so_far_is_non_increasing() {
    let log = fitness_log(&[5.0, 3.0, 8.0, -1.0, 2.0, -1.0, -4.0]);
    let best = log.best_so_far();

    assert_eq!(best.len(), log.len());
    assert!(best.windows(2).all(|pair| pair[1] <= pair[0]));
    for (i, value) in best.iter().enumerate() {
        let expected = log.fitness()[..=i].iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(*value, expected);
    }
}

#[test]
fn rolling_mean_starts_at_first_fitness() {
    let log = fitness_log(&[-10.0, -20.0, -30.0, -40.0]);

    for window in [1, 2, 10] {
        let rolling = log.rolling_mean(window);
        assert_eq!(rolling.len(), log.len());
        assert_eq!(rolling[0], -10.0);
    }
    assert_eq!(log.rolling_mean(2), [-10.0, -15.0, -25.0, -35.0]);
}

#[test]
fn head_and_tail_clamp_to_length() {
    let log = fitness_log(&[1.0, 2.0, 3.0]);

    assert_eq!(log.head(2).len(), 2);
    assert_eq!(log.head(10).len(), 3);
    assert_eq!(log.tail(2)[0].eval(), 2);
    assert_eq!(log.tail(10).len(), 3);
    assert!(log.tail(0).is_empty());
}

#[test]
fn bottom_by_fitness_breaks_ties_by_eval() {
    let log = fitness_log(&[-5.0, -9.0, -5.0, -9.0, 0.0]);

    let evals: Vec<u64> = log.bottom_by_fitness(3).iter().map(|r| r.eval()).collect();
    assert_eq!(evals, [2, 4, 1]);
}

#[test]
fn best_prefers_earliest_on_ties() {
    let log = fitness_log(&[-1.0, -7.0, -7.0]);
    assert_eq!(log.best().unwrap().eval(), 2);
}
