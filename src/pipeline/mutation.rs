//! Mutation records and the append-only change log
//!
//! Each cleaning step is captured as a [`Mutation`] holding fully resolved
//! parameters, so applying the same mutations to the same origin table always
//! yields the same result. Statistical fills store the value they computed,
//! not the strategy that produced it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::missing::{fill_column, ResolvedFill};
use super::table::{ColumnData, ColumnKind, Scalar, Table};
use super::text::{normalize_text, TextCleaning};
use crate::error::{PrepError, Result};

/// Kind tag of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    DropColumns,
    FillMissing,
    CleanText,
    DropRows,
    ReplaceValues,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::DropColumns => "drop-columns",
            MutationKind::FillMissing => "fill-missing",
            MutationKind::CleanText => "clean-text",
            MutationKind::DropRows => "drop-rows",
            MutationKind::ReplaceValues => "replace-values",
        };
        write!(f, "{}", name)
    }
}

/// A cleaning operation with resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mutation {
    DropColumns {
        columns: Vec<String>,
    },
    FillMissing {
        fills: Vec<ResolvedFill>,
    },
    CleanText {
        column: String,
        options: TextCleaning,
    },
    DropRows {
        start: usize,
        end: usize,
    },
    ReplaceValues {
        column: String,
        search: Scalar,
        replacement: Scalar,
        replaced: usize,
    },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::DropColumns { .. } => MutationKind::DropColumns,
            Mutation::FillMissing { .. } => MutationKind::FillMissing,
            Mutation::CleanText { .. } => MutationKind::CleanText,
            Mutation::DropRows { .. } => MutationKind::DropRows,
            Mutation::ReplaceValues { .. } => MutationKind::ReplaceValues,
        }
    }

    /// Columns the mutation touches. Row drops touch every column.
    pub fn columns(&self, table: &Table) -> Vec<String> {
        match self {
            Mutation::DropColumns { columns } => columns.clone(),
            Mutation::FillMissing { fills } => fills.iter().map(|f| f.column.clone()).collect(),
            Mutation::CleanText { column, .. } | Mutation::ReplaceValues { column, .. } => {
                vec![column.clone()]
            }
            Mutation::DropRows { .. } => table.column_names(),
        }
    }

    /// Apply to `table`, producing a new table.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        match self {
            Mutation::DropColumns { columns } => table.without_columns(columns),
            Mutation::FillMissing { fills } => {
                let mut replacements = Vec::with_capacity(fills.len());
                for fill in fills {
                    let data = table.column(&fill.column)?;
                    replacements.push((
                        fill.column.clone(),
                        fill_column(data, &fill.column, &fill.value)?,
                    ));
                }
                table.with_replaced(replacements)
            }
            Mutation::CleanText { column, options } => {
                let values = text_values(table, column)?;
                let cleaned = values
                    .into_iter()
                    .map(|v| v.map(|s| normalize_text(&s, *options)))
                    .collect();
                table.with_replaced(vec![(column.clone(), ColumnData::Text(cleaned))])
            }
            Mutation::DropRows { start, end } => table.without_rows(*start, *end),
            Mutation::ReplaceValues {
                column,
                search,
                replacement,
                ..
            } => {
                let (data, _) = replace_values(table, column, search, replacement)?;
                table.with_replaced(vec![(column.clone(), data)])
            }
        }
    }

    /// One-line human description, used for log events and summaries.
    pub fn describe(&self) -> String {
        match self {
            Mutation::DropColumns { columns } => format!("Dropped columns: {:?}", columns),
            Mutation::FillMissing { fills } if fills.is_empty() => {
                "No missing values to fill".to_string()
            }
            Mutation::FillMissing { fills } => fills
                .iter()
                .map(|f| {
                    format!(
                        "Filled {} missing value(s) in '{}' with {}",
                        f.filled, f.column, f.value
                    )
                })
                .collect::<Vec<_>>()
                .join("; "),
            Mutation::CleanText { column, .. } => format!("Cleaned text in column '{}'", column),
            Mutation::DropRows { start, end } => {
                format!("Dropped rows from index {} to {}", start, end)
            }
            Mutation::ReplaceValues {
                column,
                search,
                replacement,
                replaced,
            } => format!(
                "Replaced {} occurrence(s) of {} with {} in column '{}'",
                replaced, search, replacement, column
            ),
        }
    }
}

/// Text cells of a column; fails unless the column is text.
pub(crate) fn text_values(table: &Table, column: &str) -> Result<Vec<Option<String>>> {
    match table.column(column)? {
        ColumnData::Text(values) => Ok(values),
        other => Err(PrepError::TypeMismatch {
            column: column.to_string(),
            expected: ColumnKind::Text.to_string(),
            actual: other.kind().to_string(),
        }),
    }
}

/// Replace cells equal to `search` with `replacement`, returning the new
/// column and the number of replaced cells.
pub(crate) fn replace_values(
    table: &Table,
    column: &str,
    search: &Scalar,
    replacement: &Scalar,
) -> Result<(ColumnData, usize)> {
    let data = table.column(column)?;
    for operand in [search, replacement] {
        if operand.kind() != data.kind() {
            return Err(PrepError::TypeMismatch {
                column: column.to_string(),
                expected: operand.kind().to_string(),
                actual: data.kind().to_string(),
            });
        }
    }

    let mut replaced = 0;
    let mut rows = Vec::with_capacity(data.len());
    for row in 0..data.len() {
        match data.get(row) {
            Some(value) if &value == search => {
                replaced += 1;
                rows.push(Some(replacement.clone()));
            }
            other => rows.push(other),
        }
    }

    let data = match data.kind() {
        ColumnKind::Numeric => ColumnData::Numeric(
            rows.into_iter()
                .map(|v| match v {
                    Some(Scalar::Numeric(x)) => Some(x),
                    _ => None,
                })
                .collect(),
        ),
        ColumnKind::Text => ColumnData::Text(
            rows.into_iter()
                .map(|v| match v {
                    Some(Scalar::Text(s)) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        ColumnKind::Boolean => ColumnData::Boolean(
            rows.into_iter()
                .map(|v| match v {
                    Some(Scalar::Boolean(b)) => Some(b),
                    _ => None,
                })
                .collect(),
        ),
    };

    Ok((data, replaced))
}

/// One applied mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// 1-based application order within the session.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub mutation: Mutation,
    /// Columns affected by the mutation.
    pub columns: Vec<String>,
}

impl MutationRecord {
    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }
}

/// Append-only, ordered log of the mutations applied to one table lineage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MutationLog {
    records: Vec<MutationRecord>,
}

impl MutationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for `mutation`; `before` is the table it was applied to.
    pub(crate) fn append(&mut self, mutation: Mutation, before: &Table) -> &MutationRecord {
        let record = MutationRecord {
            sequence: self.records.len() as u64 + 1,
            timestamp: Utc::now(),
            columns: mutation.columns(before),
            mutation,
        };
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-apply every mutation, in order, to `origin`.
    pub fn replay(&self, origin: &Table) -> Result<Table> {
        self.records
            .iter()
            .try_fold(origin.clone(), |table, record| record.mutation.apply(&table))
    }

    /// Serialize the records as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}
