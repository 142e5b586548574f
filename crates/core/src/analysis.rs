//! The four analyzers that turn an evaluation log into diagnostics.
//!
//! Each analyzer is a pure function of an [`EvaluationLog`] (and, where it
//! needs bounds, a [`ParameterRegistry`]) plus its own configuration. None of
//! them hold state, so they can run in any order.
//!
//! - [`convergence`]: best-so-far, checkpoints, and the half-split verdict
//! - [`survival`]: survival-duration estimates under a simulation tick cap
//! - [`parameters`]: per-parameter tail spread and bound-hugging
//! - [`correlation`]: parameter–fitness correlation over all and top records
//!
//! Every analyzer rejects an empty log with an [`InsufficientDataError`].
//!
//! [`EvaluationLog`]: crate::log::EvaluationLog
//! [`ParameterRegistry`]: crate::registry::ParameterRegistry
//! [`InsufficientDataError`]: crate::InsufficientDataError

pub mod convergence;
pub mod correlation;
pub mod parameters;
pub mod survival;
