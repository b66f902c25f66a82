//! JSON export of change logs and analysis results

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    column_summary, flagged_rows, FeatureRanking, ForestConfig, MutationRecord, OutlierMethod,
    OutlierResult,
};

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// tabprep version
    pub tabprep_version: String,
    /// Input file path
    pub input_file: String,
}

impl RunMetadata {
    pub fn new(input_file: &Path) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            tabprep_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
        }
    }
}

/// Change log export
#[derive(Serialize)]
pub struct ChangesLogExport<'a> {
    pub metadata: RunMetadata,
    pub initial_shape: (usize, usize),
    pub final_shape: (usize, usize),
    pub changes: &'a [MutationRecord],
}

/// Outlier detection export
#[derive(Serialize)]
pub struct OutlierExport<'a> {
    pub metadata: RunMetadata,
    pub method: OutlierMethod,
    pub threshold: f64,
    /// Distinct rows with at least one flagged cell
    pub flagged_rows: Vec<usize>,
    pub flags_per_column: std::collections::BTreeMap<String, usize>,
    pub outliers: &'a [OutlierResult],
}

/// Forest parameters recorded with an importance export
#[derive(Serialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl From<&ForestConfig> for ForestParams {
    fn from(config: &ForestConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features,
            seed: config.seed,
        }
    }
}

/// Feature importance export
#[derive(Serialize)]
pub struct ImportanceExport<'a> {
    pub metadata: RunMetadata,
    pub forest: ForestParams,
    #[serde(flatten)]
    pub ranking: &'a FeatureRanking,
}

fn write_json<T: Serialize>(value: &T, output_path: &Path, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {} to JSON", what))?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write {} to {}", what, output_path.display()))?;

    Ok(())
}

/// Export the cleaning session's change log
pub fn export_changes_log(
    records: &[MutationRecord],
    initial_shape: (usize, usize),
    final_shape: (usize, usize),
    input_file: &Path,
    output_path: &Path,
) -> Result<()> {
    let export = ChangesLogExport {
        metadata: RunMetadata::new(input_file),
        initial_shape,
        final_shape,
        changes: records,
    };
    write_json(&export, output_path, "change log")
}

/// Export outlier detection results
pub fn export_outliers(
    results: &[OutlierResult],
    method: OutlierMethod,
    threshold: f64,
    input_file: &Path,
    output_path: &Path,
) -> Result<()> {
    let export = OutlierExport {
        metadata: RunMetadata::new(input_file),
        method,
        threshold,
        flagged_rows: flagged_rows(results),
        flags_per_column: column_summary(results),
        outliers: results,
    };
    write_json(&export, output_path, "outlier results")
}

/// Export a feature ranking
pub fn export_importance(
    ranking: &FeatureRanking,
    config: &ForestConfig,
    input_file: &Path,
    output_path: &Path,
) -> Result<()> {
    let export = ImportanceExport {
        metadata: RunMetadata::new(input_file),
        forest: ForestParams::from(config),
        ranking,
    };
    write_json(&export, output_path, "feature importance")
}
