use thiserror::Error;

use crate::{
    log::LoadError,
    registry::{SpecError, UnknownParameterError},
};

/// Error returned when a statistic needs more records than the log holds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{what} requires at least {required} record(s), found {found}")]
pub struct InsufficientDataError {
    /// The statistic or analyzer that could not be computed.
    pub what: &'static str,
    pub required: usize,
    pub found: usize,
}

impl InsufficientDataError {
    pub(crate) fn check(what: &'static str, required: usize, found: usize) -> Result<(), Self> {
        if found < required {
            Err(Self {
                what,
                required,
                found,
            })
        } else {
            Ok(())
        }
    }
}

/// Errors surfaced by the top-level analysis entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    UnknownParameter(#[from] UnknownParameterError),

    #[error("failed to load evaluation log")]
    Load(#[from] LoadError),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),
}
