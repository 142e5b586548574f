use crate::{
    Config, Error,
    log::{EvaluationLog, RawRow},
    registry::ParameterRegistry,
    report::AnalysisReport,
};

/// Loads evaluation logs and analyzes them against one registry and config.
///
/// # Example
///
/// ```
/// use hindsight_core::{Config, Pipeline, log::RawRow, registry::ParameterRegistry};
///
/// let pipeline = Pipeline::new(ParameterRegistry::default(), Config::default());
///
/// let rows = [(1, -100.0), (2, -150.0), (3, -90.0)]
///     .map(|(eval, fitness)| RawRow::new().with("eval", eval).with("fitness", fitness));
///
/// let report = pipeline.run(rows).unwrap();
/// assert_eq!(report.convergence.best.eval, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    registry: ParameterRegistry,
    config: Config,
}

impl Pipeline {
    #[must_use]
    pub fn new(registry: ParameterRegistry, config: Config) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates and orders raw rows into an evaluation log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if a row is missing a column, names an
    /// undeclared parameter, carries a malformed value, or repeats an
    /// evaluation index.
    pub fn load<I>(&self, rows: I) -> Result<EvaluationLog, Error>
    where
        I: IntoIterator<Item = RawRow>,
    {
        Ok(EvaluationLog::load(rows, &self.registry)?)
    }

    /// Validates a table's header, then loads its rows.
    ///
    /// Use this for tables read from a file, so a header naming undeclared
    /// parameters or lacking a required column is rejected even when the
    /// table has no data rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] for the same problems as [`Pipeline::load`],
    /// checked against the header first.
    pub fn load_with_columns<C, S, I>(&self, columns: C, rows: I) -> Result<EvaluationLog, Error>
    where
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
        I: IntoIterator<Item = RawRow>,
    {
        Ok(EvaluationLog::load_with_columns(
            columns,
            rows,
            &self.registry,
        )?)
    }

    /// Runs every analyzer over a loaded log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] if the log is empty.
    pub fn analyze(&self, log: &EvaluationLog) -> Result<AnalysisReport, Error> {
        Ok(AnalysisReport::synthesize(log, &self.registry, &self.config)?)
    }

    /// Loads `rows` and analyzes the result.
    ///
    /// # Errors
    ///
    /// Returns the first load or analysis error.
    pub fn run<I>(&self, rows: I) -> Result<AnalysisReport, Error>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let log = self.load(rows)?;
        self.analyze(&log)
    }
}
