use thiserror::Error;

use crate::registry::UnknownParameterError;

/// Errors that can occur when loading an evaluation log.
///
/// Loading is all-or-nothing: any of these rejects the whole log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A required column, or a parameter column other rows carry, is absent.
    ///
    /// `row` is 1-based, or [`HEADER_ROW`](super::HEADER_ROW) for the header.
    #[error("{} is missing column `{column}`", describe_row(*row))]
    MissingColumn { row: usize, column: String },

    /// A column names a parameter the registry does not declare.
    #[error("column `{}` is not a declared parameter", .0.name)]
    UnknownParameter(#[from] UnknownParameterError),

    /// A field is not a finite number, or `eval` is not a positive integer.
    #[error("row {row}: `{column}` has malformed value {value:?}")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Two rows share the same evaluation index.
    #[error("evaluation index {0} appears more than once")]
    DuplicateEval(u64),
}

fn describe_row(row: usize) -> String {
    if row == super::HEADER_ROW {
        "header".to_owned()
    } else {
        format!("row {row}")
    }
}
