//! tabprep: Tabular Data Preparation CLI Tool
//!
//! Cleans datasets with a replayable change log, flags outliers and ranks
//! features by importance.

use anyhow::Result;
use clap::Parser;

use tabprep::cli::{run_clean, run_importance, run_outliers, Cli, Commands};
use tabprep::utils::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        verbose: cli.verbose,
        format: cli.log_format,
    })?;

    match &cli.command {
        Commands::Clean(args) => run_clean(args),
        Commands::Outliers(args) => run_outliers(args),
        Commands::Importance(args) => run_importance(args),
    }
}
