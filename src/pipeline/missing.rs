//! Missing value analysis and fill resolution

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::table::{ColumnData, Scalar, Table};
use crate::error::{PrepError, Result};

/// How missing cells should be filled.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    /// One scalar for every column of the same kind.
    Value(Scalar),
    /// Mean for numeric columns, mode for text and boolean columns.
    Strategy,
}

impl From<Scalar> for FillValue {
    fn from(value: Scalar) -> Self {
        FillValue::Value(value)
    }
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        FillValue::Value(Scalar::from(value))
    }
}

impl From<i32> for FillValue {
    fn from(value: i32) -> Self {
        FillValue::Value(Scalar::from(value))
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        FillValue::Value(Scalar::from(value))
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Value(Scalar::from(value))
    }
}

/// A fill value resolved for one column, with the number of cells it replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFill {
    pub column: String,
    pub value: Scalar,
    pub filled: usize,
}

/// Missing-value counts for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingProfile {
    pub column: String,
    pub missing: usize,
    pub ratio: f64,
}

/// Analyze missing values in every column.
///
/// Returns one profile per column sorted by missing ratio descending; columns
/// with equal ratios keep table order.
pub fn analyze_missing_values(table: &Table) -> Result<Vec<MissingProfile>> {
    // Handle empty table
    if table.height() == 0 {
        return Ok(Vec::new());
    }

    let rows = table.height() as f64;
    let mut profiles = Vec::with_capacity(table.width());

    for name in table.column_names() {
        let missing = table.missing_count(&name)?;
        profiles.push(MissingProfile {
            column: name,
            missing,
            ratio: missing as f64 / rows,
        });
    }

    profiles.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));

    Ok(profiles)
}

/// Resolve the concrete value used for each column that has missing cells.
///
/// Columns without missing cells are left out. Resolution is all-or-nothing:
/// one incompatible column fails the whole request.
pub fn resolve_fill_values(table: &Table, fill: &FillValue) -> Result<Vec<ResolvedFill>> {
    if let FillValue::Value(Scalar::Numeric(v)) = fill {
        if !v.is_finite() {
            return Err(PrepError::invalid_argument(format!(
                "fill value must be a finite number, got {}",
                v
            )));
        }
    }

    let mut resolved = Vec::new();

    for name in table.column_names() {
        let data = table.column(&name)?;
        let filled = data.missing_count();
        if filled == 0 {
            continue;
        }

        let value = match fill {
            FillValue::Value(scalar) => {
                if scalar.kind() != data.kind() {
                    return Err(PrepError::TypeMismatch {
                        column: name,
                        expected: scalar.kind().to_string(),
                        actual: data.kind().to_string(),
                    });
                }
                scalar.clone()
            }
            FillValue::Strategy => strategy_value(&data).ok_or(PrepError::InsufficientData {
                required: 1,
                actual: 0,
            })?,
        };

        resolved.push(ResolvedFill {
            column: name,
            value,
            filled,
        });
    }

    Ok(resolved)
}

/// Replace missing cells of `data` with `value`; non-missing cells are untouched.
pub(crate) fn fill_column(data: ColumnData, column: &str, value: &Scalar) -> Result<ColumnData> {
    let filled = match (data, value) {
        (ColumnData::Numeric(values), Scalar::Numeric(v)) => {
            ColumnData::Numeric(values.into_iter().map(|x| x.or(Some(*v))).collect())
        }
        (ColumnData::Text(values), Scalar::Text(v)) => ColumnData::Text(
            values
                .into_iter()
                .map(|x| x.or_else(|| Some(v.clone())))
                .collect(),
        ),
        (ColumnData::Boolean(values), Scalar::Boolean(v)) => {
            ColumnData::Boolean(values.into_iter().map(|x| x.or(Some(*v))).collect())
        }
        (data, value) => {
            return Err(PrepError::TypeMismatch {
                column: column.to_string(),
                expected: value.kind().to_string(),
                actual: data.kind().to_string(),
            })
        }
    };
    Ok(filled)
}

fn strategy_value(data: &ColumnData) -> Option<Scalar> {
    match data {
        ColumnData::Numeric(values) => mean(values)
            .filter(|m| m.is_finite())
            .map(Scalar::Numeric),
        ColumnData::Text(values) => mode(values.iter().flatten().cloned()).map(Scalar::Text),
        ColumnData::Boolean(values) => mode(values.iter().flatten().copied()).map(Scalar::Boolean),
    }
}

/// Mean over non-missing values.
pub(crate) fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode<T: Hash + Eq>(values: impl Iterator<Item = T>) -> Option<T> {
    // value -> (first position, count)
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        counts.entry(value).or_insert((position, 0)).1 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (pa, na)), (_, (pb, nb))| na.cmp(nb).then(pb.cmp(pa)))
        .map(|(value, _)| value)
}
