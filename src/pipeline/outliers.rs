//! Statistical outlier detection over numeric columns
//!
//! Two univariate methods are supported:
//!
//! - **zscore**: `|v - mean| / sd > threshold`, using the sample standard
//!   deviation (n - 1). Columns with zero deviation never flag.
//! - **iqr**: `v < Q1 - threshold * IQR` or `v > Q3 + threshold * IQR`, with
//!   quartiles linearly interpolated between order statistics.
//!
//! Missing cells are excluded from the statistics and never reported.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::table::Table;
use crate::error::{PrepError, Result};

/// Outlier detection method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    #[default]
    ZScore,
    Iqr,
}

impl std::fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierMethod::ZScore => write!(f, "zscore"),
            OutlierMethod::Iqr => write!(f, "iqr"),
        }
    }
}

impl std::str::FromStr for OutlierMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zscore" => Ok(OutlierMethod::ZScore),
            "iqr" => Ok(OutlierMethod::Iqr),
            _ => Err(PrepError::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// One flagged (row, column) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierResult {
    pub row: usize,
    pub column: String,
    /// Absolute z-score, or distance beyond the nearer quartile in IQR units.
    pub score: f64,
    pub flagged: bool,
}

/// Read-only outlier detector over one table snapshot.
#[derive(Debug, Clone, Copy)]
pub struct OutlierDetector<'a> {
    table: &'a Table,
}

impl<'a> OutlierDetector<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    /// Detect outliers with a method given by name (`zscore` or `iqr`).
    pub fn detect_outliers(&self, method: &str, threshold: f64) -> Result<Vec<OutlierResult>> {
        let method: OutlierMethod = method.parse()?;
        self.detect(method, threshold)
    }

    /// Detect outliers in every numeric column.
    ///
    /// Results are ordered by row, then by column position.
    pub fn detect(&self, method: OutlierMethod, threshold: f64) -> Result<Vec<OutlierResult>> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(PrepError::invalid_argument(format!(
                "threshold must be a positive number, got {}",
                threshold
            )));
        }

        let mut results: Vec<(usize, OutlierResult)> = Vec::new();

        for (col_idx, name) in self.table.numeric_columns().into_iter().enumerate() {
            let values = self.table.numeric_values(&name)?;
            let scored = match method {
                OutlierMethod::ZScore => zscore_flags(&values, threshold),
                OutlierMethod::Iqr => iqr_flags(&values, threshold),
            };
            debug!(column = %name, %method, flagged = scored.len(), "scored column");

            results.extend(scored.into_iter().map(|(row, score)| {
                (
                    col_idx,
                    OutlierResult {
                        row,
                        column: name.clone(),
                        score,
                        flagged: true,
                    },
                )
            }));
        }

        results.sort_by_key(|(col_idx, r)| (r.row, *col_idx));
        Ok(results.into_iter().map(|(_, r)| r).collect())
    }
}

/// Convenience wrapper over [`OutlierDetector::detect_outliers`].
pub fn detect_outliers(table: &Table, method: &str, threshold: f64) -> Result<Vec<OutlierResult>> {
    OutlierDetector::new(table).detect_outliers(method, threshold)
}

/// Distinct rows with at least one flagged cell, ascending.
pub fn flagged_rows(results: &[OutlierResult]) -> Vec<usize> {
    let mut rows: Vec<usize> = results.iter().filter(|r| r.flagged).map(|r| r.row).collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

/// Flag count per column, ordered by column name.
pub fn column_summary(results: &[OutlierResult]) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for result in results.iter().filter(|r| r.flagged) {
        *summary.entry(result.column.clone()).or_insert(0) += 1;
    }
    summary
}

/// Mean and sample standard deviation of the observed values.
///
/// `None` when fewer than two values are present.
pub fn mean_and_sample_std(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    let n = observed.len();
    if n < 2 {
        return None;
    }
    let mean = observed.iter().sum::<f64>() / n as f64;
    let ss: f64 = observed.iter().map(|v| (v - mean).powi(2)).sum();
    Some((mean, (ss / (n - 1) as f64).sqrt()))
}

/// First and third quartiles by linear interpolation.
///
/// `None` when no values are present.
pub fn quartiles(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some((quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75)))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn zscore_flags(values: &[Option<f64>], threshold: f64) -> Vec<(usize, f64)> {
    let Some((mean, std)) = mean_and_sample_std(values) else {
        return Vec::new();
    };
    // Constant column: nothing can deviate.
    if std == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| {
            let score = (v.as_ref()? - mean).abs() / std;
            (score > threshold).then_some((row, score))
        })
        .collect()
}

fn iqr_flags(values: &[Option<f64>], threshold: f64) -> Vec<(usize, f64)> {
    let Some((q1, q3)) = quartiles(values) else {
        return Vec::new();
    };
    let iqr = q3 - q1;
    let lower = q1 - threshold * iqr;
    let upper = q3 + threshold * iqr;

    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| {
            let v = (*v)?;
            if v >= lower && v <= upper {
                return None;
            }
            let distance = if v < q1 { q1 - v } else { v - q3 };
            let score = if iqr > 0.0 { distance / iqr } else { f64::INFINITY };
            Some((row, score))
        })
        .collect()
}
