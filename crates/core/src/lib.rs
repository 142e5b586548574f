//! Post-hoc diagnostics for black-box optimizer runs.
//!
//! Given the per-evaluation history of a search (an index, a scalar fitness
//! to minimize, and the parameter vector that produced it), this crate
//! answers a few questions about the run:
//!
//! - Has the search converged, or is it still finding better solutions?
//! - What does the fitness imply about how long the simulated runs survived,
//!   and how often they hit the simulation's tick cap?
//! - Which parameters have settled, which are still exploring, and which are
//!   pressed against their declared bounds?
//! - Which parameters correlate with fitness, over the whole run and among
//!   its best evaluations?
//!
//! A [`Pipeline`] ties it together: it owns a [`ParameterRegistry`] of
//! declared bounds and a [`Config`], loads [`RawRow`]s into an
//! [`EvaluationLog`], and synthesizes an [`AnalysisReport`].
//!
//! [`ParameterRegistry`]: registry::ParameterRegistry
//! [`RawRow`]: log::RawRow
//! [`EvaluationLog`]: log::EvaluationLog

pub mod analysis;
pub mod log;
pub mod registry;
pub mod stats;

mod config;
mod error;
mod pipeline;
mod report;

pub use config::{Config, ConfigError};
pub use error::{Error, InsufficientDataError};
pub use pipeline::Pipeline;
pub use report::{AnalysisReport, BestParameter, NewParameterRow};
