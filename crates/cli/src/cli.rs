use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Convergence, survival, and correlation diagnostics for an optimizer log.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Evaluation log (CSV with `eval`, `fitness`, and parameter columns)
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Path to config TOML (defaults to the built-in exp10 parameter table)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Simulation tick cap (overrides config)
    #[arg(long, value_name = "N")]
    pub max_ticks: Option<u64>,

    /// Write PNG charts into this directory
    #[arg(long, value_name = "DIR")]
    pub plots: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Open an interactive convergence window after the report
    #[cfg(feature = "viewer")]
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter for the verbosity level; `RUST_LOG` takes precedence.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
