//! Optional TOML configuration.
//!
//! ```toml
//! max_ticks = 3000000
//! seconds_per_tick = 0.016666666666666666
//! new_parameters = ["detritus_fraction"]
//!
//! [[parameter]]
//! name = "detritus_fraction"
//! min = 0.0
//! max = 0.3
//! default = 0.1
//! ```
//!
//! Every key is optional. Without a `[[parameter]]` table the built-in exp10
//! registry is used, along with its new-parameter subset unless
//! `new_parameters` is given.

use std::{fs, io, path::Path, path::PathBuf};

use hindsight_core::{
    Config, ConfigError,
    analysis::survival::SurvivalModel,
    registry::{ParameterRegistry, ParameterSpec, SpecError, UnknownParameterError},
};
use serde::Deserialize;
use thiserror::Error;
use uom::si::{f64::Time, time::second};

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameter table")]
    Spec(#[from] SpecError),

    #[error("invalid new-parameter list")]
    UnknownParameter(#[from] UnknownParameterError),

    #[error("invalid analysis setting")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ParameterEntry {
    name: String,
    min: f64,
    max: f64,
    default: f64,
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    max_ticks: Option<u64>,
    seconds_per_tick: Option<f64>,
    new_parameters: Option<Vec<String>>,

    #[serde(default, rename = "parameter")]
    parameters: Vec<ParameterEntry>,
}

impl ConfigFile {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the parameter registry this file describes.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter entry is invalid or a new parameter
    /// is not declared.
    pub fn registry(&self) -> Result<ParameterRegistry, ConfigFileError> {
        if self.parameters.is_empty() {
            let registry = ParameterRegistry::exp10();
            return Ok(match &self.new_parameters {
                Some(names) => registry.with_new_parameters(names)?,
                None => registry,
            });
        }

        let specs = self
            .parameters
            .iter()
            .map(|p| ParameterSpec::new(p.name.as_str(), p.min, p.max, p.default))
            .collect::<Result<Vec<_>, _>>()?;

        let registry = ParameterRegistry::new(specs)?;
        Ok(registry.with_new_parameters(self.new_parameters.iter().flatten())?)
    }

    /// Builds the analysis configuration, letting `max_ticks` override the
    /// file's value.
    ///
    /// # Errors
    ///
    /// Returns an error if a survival setting is out of range.
    pub fn config(&self, max_ticks: Option<u64>) -> Result<Config, ConfigFileError> {
        let mut survival = SurvivalModel::default();
        if let Some(max_ticks) = max_ticks.or(self.max_ticks) {
            survival = survival.with_max_ticks(max_ticks)?;
        }
        if let Some(seconds) = self.seconds_per_tick {
            survival = survival.with_tick_duration(Time::new::<second>(seconds))?;
        }
        Ok(Config::default().with_survival(survival))
    }
}
