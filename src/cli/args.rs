//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{FileFormat, ForestConfig, OutlierMethod, Scalar};
use crate::utils::LogFormat;

/// tabprep - Tracked cleaning, outlier detection and feature ranking for tabular data
#[derive(Parser, Debug)]
#[command(name = "tabprep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level log events (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of log events written to stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply tracked cleaning operations and save the result
    Clean(CleanArgs),
    /// Flag outlying numeric values
    Outliers(OutlierArgs),
    /// Rank features by random forest importance against a target column
    Importance(ImportanceArgs),
}

/// Options shared by all subcommands for reading the input file.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input file path (CSV, Parquet, or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format; inferred from the extension when omitted
    #[arg(long, value_parser = parse_format)]
    pub format: Option<FileFormat>,

    /// Columns to keep after loading (comma-separated). Default: all.
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Columns to drop (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Inclusive row range to drop, as START:END (0-based)
    #[arg(long, value_parser = parse_row_range)]
    pub drop_rows: Option<(usize, usize)>,

    /// Fill missing cells of matching type with this value
    #[arg(long, conflicts_with = "fill_strategy")]
    pub fill_value: Option<String>,

    /// Fill missing cells with the column mean (numeric) or mode (text, boolean)
    #[arg(long)]
    pub fill_strategy: bool,

    /// Text columns to normalize (repeatable)
    #[arg(long)]
    pub clean_text: Vec<String>,

    /// Also strip URLs and punctuation when normalizing text
    #[arg(long)]
    pub thorough: bool,

    /// Replace exact cell values, as COLUMN=OLD=>NEW (repeatable)
    #[arg(long, value_parser = parse_replacement)]
    pub replace: Vec<Replacement>,

    /// Output file path (CSV, Parquet or JSON, determined by extension).
    /// Defaults to input directory with '_clean' suffix (e.g., data.csv → data_clean.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the change log as JSON to this path
    #[arg(long)]
    pub log_output: Option<PathBuf>,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl CleanArgs {
    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derived_path(&self.source.input, "clean"))
    }
}

#[derive(Args, Debug)]
pub struct OutlierArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Detection method: "zscore" or "iqr"
    #[arg(short, long, default_value = "zscore", value_parser = parse_method)]
    pub method: OutlierMethod,

    /// Flagging threshold (z-score, or IQR multiplier). Must be positive.
    #[arg(short, long, default_value = "3.0", value_parser = validate_threshold)]
    pub threshold: f64,

    /// Maximum number of flagged cells to print
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Write results as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportanceArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Target column name
    #[arg(short, long)]
    pub target: String,

    /// Number of trees in the forest
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    pub trees: u64,

    /// Maximum depth of each tree
    #[arg(long, default_value = "12")]
    pub max_depth: usize,

    /// Minimum rows in a node before it may split
    #[arg(long, default_value = "2")]
    pub min_samples_split: usize,

    /// Features tried per split. Default: sqrt(n) for classification, all for regression.
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Random seed for bootstrap sampling
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of top features to print
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Write the full ranking as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl ImportanceArgs {
    pub fn forest_config(&self) -> ForestConfig {
        let config = ForestConfig::default()
            .n_trees(self.trees as usize)
            .max_depth(self.max_depth)
            .min_samples_split(self.min_samples_split)
            .seed(self.seed);
        match self.max_features {
            Some(n) => config.max_features(n),
            None => config,
        }
    }
}

/// A `--replace COLUMN=OLD=>NEW` instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub column: String,
    pub search: Scalar,
    pub replacement: Scalar,
}

/// Derive `<dir>/<stem>_<suffix>.<ext>` from an input path.
fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("csv");
    parent.join(format!("{}_{}.{}", stem, suffix, extension))
}

fn parse_format(s: &str) -> Result<FileFormat, String> {
    s.parse()
}

fn parse_method(s: &str) -> Result<OutlierMethod, String> {
    s.parse().map_err(|e: crate::error::PrepError| e.to_string())
}

/// Validator for the outlier threshold
fn validate_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !value.is_finite() || value <= 0.0 {
        Err(format!("threshold must be a positive number, got {}", value))
    } else {
        Ok(value)
    }
}

fn parse_row_range(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("'{}' is not a START:END row range", s))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid row index", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid row index", end))?;
    if start > end {
        return Err(format!("row range start {} is after end {}", start, end));
    }
    Ok((start, end))
}

fn parse_replacement(s: &str) -> Result<Replacement, String> {
    let (column, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not COLUMN=OLD=>NEW", s))?;
    let (search, replacement) = rest
        .split_once("=>")
        .ok_or_else(|| format!("'{}' is not COLUMN=OLD=>NEW", s))?;
    if column.is_empty() {
        return Err(format!("'{}' has an empty column name", s));
    }
    Ok(Replacement {
        column: column.to_string(),
        search: Scalar::parse(search),
        replacement: Scalar::parse(replacement),
    })
}
