//! The ordered history of optimizer evaluations.
//!
//! An [`EvaluationLog`] is built once from raw tabular rows with
//! [`EvaluationLog::load`] and never mutated afterwards. Records are ordered
//! by evaluation index, and that order is the time axis for every rolling,
//! head, and tail computation in the crate.
//!
//! # Validation
//!
//! Loading checks, in order:
//!
//! 1. Every row, and the header when one is given, has the `eval` and
//!    `fitness` columns.
//! 2. Every other column is a parameter declared in the registry, and every
//!    row carries the same parameter columns. Declared parameters that never
//!    appear are fine; they are simply absent from the log.
//! 3. Every field parses as a finite number, and `eval` as a positive
//!    integer.
//! 4. Evaluation indices are unique. Rows are sorted by index if needed.
//!
//! A table read from a file should go through [`EvaluationLog::load_with_columns`]
//! so its header is checked even when it has no data rows.
//!
//! An empty log is valid. Analyses over it fail with
//! [`InsufficientDataError`] instead of producing undefined aggregates.

mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{InsufficientDataError, registry::ParameterRegistry, stats};

pub use error::LoadError;

/// Name of the evaluation index column.
pub const EVAL_COLUMN: &str = "eval";

/// Name of the fitness column.
pub const FITNESS_COLUMN: &str = "fitness";

/// Row number used in errors that refer to a table's header.
pub const HEADER_ROW: usize = 0;

fn is_parameter_column(column: &str) -> bool {
    column != EVAL_COLUMN && column != FITNESS_COLUMN
}

/// One unparsed row of an evaluation table, keyed by column name.
///
/// # Example
///
/// ```
/// use hindsight_core::log::RawRow;
///
/// let row = RawRow::new().with("eval", 1).with("fitness", -120.5);
/// assert_eq!(row.get("fitness"), Some("-120.5"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the row for chaining.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl ToString) {
        self.0.insert(column.into(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Returns the column names of this row in lexical order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// One evaluation: its index, its fitness, and the configuration evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    eval: u64,
    fitness: f64,
    parameters: BTreeMap<String, f64>,
}

impl EvaluationRecord {
    /// The 1-based evaluation index.
    #[must_use]
    pub fn eval(&self) -> u64 {
        self.eval
    }

    /// The fitness score, lower is better.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Returns the value of a parameter, if the log carries it.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }
}

/// An immutable, evaluation-ordered sequence of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationLog {
    records: Vec<EvaluationRecord>,
    parameter_names: Vec<String>,
}

impl EvaluationLog {
    /// Validates and parses raw rows into a log.
    ///
    /// See the [module docs](self) for the validation order.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing the first problem found.
    pub fn load<I>(rows: I, registry: &ParameterRegistry) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let rows: Vec<RawRow> = rows.into_iter().collect();

        for (i, row) in rows.iter().enumerate() {
            for required in [EVAL_COLUMN, FITNESS_COLUMN] {
                if row.get(required).is_none() {
                    return Err(LoadError::MissingColumn {
                        row: i + 1,
                        column: required.to_owned(),
                    });
                }
            }
        }

        let parameter_names = Self::parameter_columns(&rows, registry)?;

        let mut records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_record(i + 1, row, &parameter_names))
            .collect::<Result<Vec<_>, _>>()?;

        if !records.is_sorted_by_key(EvaluationRecord::eval) {
            debug!("evaluation rows are out of order, sorting by index");
            records.sort_by_key(EvaluationRecord::eval);
        }
        if let Some(pair) = records.windows(2).find(|pair| pair[0].eval == pair[1].eval) {
            return Err(LoadError::DuplicateEval(pair[0].eval));
        }

        info!(
            records = records.len(),
            parameters = parameter_names.len(),
            "loaded evaluation log"
        );

        Ok(Self {
            records,
            parameter_names,
        })
    }

    /// Validates a table's header, then loads its rows.
    ///
    /// The header is checked for the required columns and for undeclared
    /// parameters first, so a table with a bad header fails even when it has
    /// no data rows. Errors about the header use [`HEADER_ROW`].
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing the first problem found.
    pub fn load_with_columns<C, S, I>(
        columns: C,
        rows: I,
        registry: &ParameterRegistry,
    ) -> Result<Self, LoadError>
    where
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
        I: IntoIterator<Item = RawRow>,
    {
        let header: Vec<S> = columns.into_iter().collect();
        let columns: Vec<&str> = header.iter().map(|column| column.as_ref()).collect();

        for required in [EVAL_COLUMN, FITNESS_COLUMN] {
            if !columns.contains(&required) {
                return Err(LoadError::MissingColumn {
                    row: HEADER_ROW,
                    column: required.to_owned(),
                });
            }
        }

        for &column in &columns {
            if is_parameter_column(column) {
                registry.spec_for(column)?;
            }
        }

        Self::load(rows, registry)
    }

    /// Resolves the parameter columns shared by every row, in registry order.
    fn parameter_columns(
        rows: &[RawRow],
        registry: &ParameterRegistry,
    ) -> Result<Vec<String>, LoadError> {
        for row in rows {
            for column in row.columns().filter(|column| is_parameter_column(column)) {
                registry.spec_for(column)?;
            }
        }

        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };

        let names: Vec<String> = registry
            .names()
            .filter(|name| first.get(name).is_some())
            .map(str::to_owned)
            .collect();

        for (i, row) in rows.iter().enumerate() {
            let mismatch = registry
                .names()
                .find(|name| row.get(name).is_some() != first.get(name).is_some());

            if let Some(name) = mismatch {
                // Blame whichever of the two rows lacks the column.
                let row = if row.get(name).is_none() { i + 1 } else { 1 };
                return Err(LoadError::MissingColumn {
                    row,
                    column: name.to_owned(),
                });
            }
        }

        Ok(names)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records in evaluation order.
    #[must_use]
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// Returns the parameters carried by this log, in registry order.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Returns the fitness series in evaluation order.
    #[must_use]
    pub fn fitness(&self) -> Vec<f64> {
        fitness_of(&self.records)
    }

    /// Returns the evaluation indices in order.
    #[must_use]
    pub fn evals(&self) -> Vec<u64> {
        self.records.iter().map(EvaluationRecord::eval).collect()
    }

    /// Returns one parameter's value series, or `None` if the log lacks it.
    #[must_use]
    pub fn parameter_series(&self, name: &str) -> Option<Vec<f64>> {
        if !self.parameter_names.iter().any(|n| n == name) {
            return None;
        }
        self.records
            .iter()
            .map(|record| record.parameter(name))
            .collect()
    }

    /// Returns the cumulative minimum of fitness.
    ///
    /// Element `i` is the best fitness among the first `i + 1` evaluations.
    #[must_use]
    pub fn best_so_far(&self) -> Vec<f64> {
        stats::cumulative_min(&self.fitness())
    }

    /// Returns the trailing rolling mean of fitness.
    ///
    /// Windows are partial at the start, so element `0` is the first fitness.
    #[must_use]
    pub fn rolling_mean(&self, window: usize) -> Vec<f64> {
        stats::rolling_mean(&self.fitness(), window)
    }

    /// Returns the first `min(n, len)` records.
    #[must_use]
    pub fn head(&self, n: usize) -> &[EvaluationRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Returns the last `min(n, len)` records, in evaluation order.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[EvaluationRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Returns the `min(n, len)` records with the smallest fitness.
    ///
    /// Ties go to the earlier evaluation.
    #[must_use]
    pub fn bottom_by_fitness(&self, n: usize) -> Vec<&EvaluationRecord> {
        let mut ranked: Vec<&EvaluationRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| a.fitness.total_cmp(&b.fitness).then(a.eval.cmp(&b.eval)));
        ranked.truncate(n);
        ranked
    }

    /// Returns the record with the smallest fitness, earliest on ties.
    ///
    /// # Errors
    ///
    /// Returns an [`InsufficientDataError`] if the log is empty.
    pub fn best(&self) -> Result<&EvaluationRecord, InsufficientDataError> {
        self.bottom_by_fitness(1)
            .first()
            .copied()
            .ok_or(InsufficientDataError {
                what: "global best",
                required: 1,
                found: 0,
            })
    }
}

/// Extracts the fitness series from a slice of records.
pub(crate) fn fitness_of<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> Vec<f64> {
    records.into_iter().map(EvaluationRecord::fitness).collect()
}

fn parse_record(
    row_number: usize,
    row: &RawRow,
    parameter_names: &[String],
) -> Result<EvaluationRecord, LoadError> {
    let field = |column: &str| -> Result<f64, LoadError> {
        // Columns were checked before parsing, so a missing field reads as "".
        let raw = row.get(column).unwrap_or_default();
        parse_finite(raw).ok_or_else(|| LoadError::MalformedValue {
            row: row_number,
            column: column.to_owned(),
            value: raw.to_owned(),
        })
    };

    let eval_raw = row.get(EVAL_COLUMN).unwrap_or_default();
    let eval = parse_eval(eval_raw).ok_or_else(|| LoadError::MalformedValue {
        row: row_number,
        column: EVAL_COLUMN.to_owned(),
        value: eval_raw.to_owned(),
    })?;

    let fitness = field(FITNESS_COLUMN)?;

    let parameters = parameter_names
        .iter()
        .map(|name| Ok((name.clone(), field(name)?)))
        .collect::<Result<_, LoadError>>()?;

    Ok(EvaluationRecord {
        eval,
        fitness,
        parameters,
    })
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a 1-based evaluation index written as an integer or an integral
/// float.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_eval(raw: &str) -> Option<u64> {
    // 2^64, the first float that does not fit in a u64.
    const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

    let raw = raw.trim();
    let eval = match raw.parse::<u64>() {
        Ok(eval) => eval,
        Err(_) => {
            let value = parse_finite(raw)?;
            if value < 0.0 || value >= U64_LIMIT || value.fract() != 0.0 {
                return None;
            }
            value as u64
        }
    };

    (eval > 0).then_some(eval)
}
