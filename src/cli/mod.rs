//! CLI module - argument parsing, interactive prompts and subcommand runners

mod args;
mod commands;
mod prompts;

pub use args::{CleanArgs, Cli, Commands, ImportanceArgs, InputArgs, OutlierArgs, Replacement};
pub use commands::{run_clean, run_importance, run_outliers};
pub use prompts::*;
