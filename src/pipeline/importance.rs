//! Feature importance ranking against a target column
//!
//! Every non-target column is a feature. Numeric values are used as-is,
//! booleans as 0/1 and text as ordinal codes in order of first appearance.
//! Rows with a missing value in any used column are excluded before fitting.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::forest::{forest_importances, ForestConfig, Task};
use super::table::{ColumnData, ColumnKind, Table};
use crate::error::{PrepError, Result};

/// Fewest complete rows a forest can be fitted on.
pub const MIN_FIT_ROWS: usize = 2;

/// Relevance score of one feature column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub score: f64,
}

/// Ranked importances plus details of the fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRanking {
    pub target: String,
    pub task: Task,
    pub rows_used: usize,
    pub rows_excluded: usize,
    /// Sorted by score descending; ties keep column order.
    pub importances: Vec<FeatureImportance>,
}

impl FeatureRanking {
    /// The `n` highest-ranked features.
    pub fn top(&self, n: usize) -> &[FeatureImportance] {
        &self.importances[..n.min(self.importances.len())]
    }
}

/// Ranks feature columns of one table snapshot.
#[derive(Debug, Clone)]
pub struct FeatureRanker<'a> {
    table: &'a Table,
    config: ForestConfig,
}

impl<'a> FeatureRanker<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self::with_config(table, ForestConfig::default())
    }

    pub fn with_config(table: &'a Table, config: ForestConfig) -> Self {
        Self { table, config }
    }

    /// Fit a random forest against `target_column` and rank the other columns.
    pub fn feature_importance(&self, target_column: &str) -> Result<FeatureRanking> {
        let target_kind = self.table.kind(target_column)?;
        let task = match target_kind {
            ColumnKind::Numeric => Task::Regression,
            ColumnKind::Text | ColumnKind::Boolean => Task::Classification,
        };

        let feature_names: Vec<String> = self
            .table
            .column_names()
            .into_iter()
            .filter(|name| name != target_column)
            .collect();
        if feature_names.is_empty() {
            return Err(PrepError::invalid_argument(format!(
                "no feature columns besides target '{}'",
                target_column
            )));
        }

        let target = self.table.column(target_column)?;
        let features = feature_names
            .iter()
            .map(|name| self.table.column(name))
            .collect::<Result<Vec<_>>>()?;

        // Exclusion policy: a row is usable only if every used column is present.
        let complete: Vec<usize> = (0..self.table.height())
            .filter(|&row| !target.is_missing(row) && features.iter().all(|f| !f.is_missing(row)))
            .collect();
        let rows_excluded = self.table.height() - complete.len();
        if complete.len() < MIN_FIT_ROWS {
            return Err(PrepError::InsufficientData {
                required: MIN_FIT_ROWS,
                actual: complete.len(),
            });
        }
        debug!(rows = complete.len(), rows_excluded, %task, "fitting forest");

        let x: Vec<Vec<f64>> = features.iter().map(|f| encode(f, &complete)).collect();
        let y = encode(&target, &complete);
        let scores = forest_importances(&x, &y, task, &self.config);

        let mut importances: Vec<FeatureImportance> = feature_names
            .into_iter()
            .zip(scores)
            .map(|(feature, score)| FeatureImportance { feature, score })
            .collect();
        // Stable: equal scores keep column order
        importances.sort_by(|a, b| b.score.total_cmp(&a.score));

        info!(
            target = target_column,
            %task,
            features = importances.len(),
            rows = complete.len(),
            "Ranked features"
        );

        Ok(FeatureRanking {
            target: target_column.to_string(),
            task,
            rows_used: complete.len(),
            rows_excluded,
            importances,
        })
    }
}

/// Rank features with the default forest configuration.
pub fn feature_importance(table: &Table, target_column: &str) -> Result<FeatureRanking> {
    FeatureRanker::new(table).feature_importance(target_column)
}

/// Encode the selected rows of a column as numbers.
///
/// Text becomes ordinal codes by first appearance among the selected rows.
fn encode(data: &ColumnData, rows: &[usize]) -> Vec<f64> {
    match data {
        ColumnData::Numeric(values) => rows.iter().map(|&r| values[r].unwrap_or(0.0)).collect(),
        ColumnData::Boolean(values) => rows
            .iter()
            .map(|&r| if values[r].unwrap_or(false) { 1.0 } else { 0.0 })
            .collect(),
        ColumnData::Text(values) => {
            let mut codes: HashMap<&str, usize> = HashMap::new();
            rows.iter()
                .map(|&r| {
                    let value = values[r].as_deref().unwrap_or("");
                    let next = codes.len();
                    *codes.entry(value).or_insert(next) as f64
                })
                .collect()
        }
    }
}
