//! Command-line front end for hindsight.
//!
//! # Usage
//!
//! ```text
//! hindsight optimize_log.csv
//! hindsight optimize_log.csv --plots charts/
//! hindsight optimize_log.csv --config exp.toml --max-ticks 1000000 --json
//! ```
//!
//! The text report goes to stdout. Logs go to stderr and follow `RUST_LOG`
//! when it is set, otherwise the `-v` level.

mod cli;
mod config;
mod reader;
mod text;

use std::{
    error::Error,
    fs::File,
    io::{self, BufReader, Write},
    process::ExitCode,
};

use clap::Parser;
use hindsight_core::Pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{cli::Args, config::ConfigFile};

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut chain = vec![err.to_string()];
            let mut source = err.source();
            while let Some(cause) = source {
                chain.push(cause.to_string());
                source = cause.source();
            }
            eprintln!("error: {}", chain.join(": "));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let pipeline = Pipeline::new(file.registry()?, file.config(args.max_ticks)?);

    info!(path = %args.log.display(), "reading evaluation log");
    let input = File::open(&args.log)
        .map_err(|err| format!("failed to open `{}`: {err}", args.log.display()))?;
    let table = reader::read_table(BufReader::new(input))?;
    let log = pipeline.load_with_columns(&table.columns, table.rows)?;
    let report = pipeline.analyze(&log)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        text::write_report(&mut out, &report, pipeline.config())?;
    }

    if let Some(dir) = &args.plots {
        let written = hindsight_plot::render_all(dir, &log, &report)?;
        if !args.json {
            writeln!(out, "PLOTS SAVED:")?;
            for path in written {
                writeln!(out, "  {}", path.display())?;
            }
        }
    }

    #[cfg(feature = "viewer")]
    if args.show {
        hindsight_plot::ConvergenceViewer::new(&log, &report).run("hindsight")?;
    }

    Ok(())
}
