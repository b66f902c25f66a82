//! Typed, immutable table model
//!
//! A [`Table`] wraps a polars `DataFrame` whose columns have been normalized to
//! one of three kinds: numeric (`Float64`), text (`String`) or boolean. Every
//! transformation returns a new `Table`; polars columns are reference counted,
//! so cloning a table is cheap and never copies cell data.

use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Kind of values a column holds, fixed when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// A single non-missing cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    Numeric(f64),
    Text(String),
    Boolean(bool),
}

impl Scalar {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Scalar::Numeric(_) => ColumnKind::Numeric,
            Scalar::Text(_) => ColumnKind::Text,
            Scalar::Boolean(_) => ColumnKind::Boolean,
        }
    }

    /// Parse a command-line literal: `true`/`false` are booleans, anything that
    /// parses as a float is numeric, everything else is text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Scalar::Boolean(true),
            "false" => Scalar::Boolean(false),
            _ => raw
                .parse::<f64>()
                .map(Scalar::Numeric)
                .unwrap_or_else(|_| Scalar::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Numeric(v) => write!(f, "{}", v),
            Scalar::Text(s) => write!(f, "'{}'", s),
            Scalar::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Numeric(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Numeric(f64::from(v))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// Materialized values of one column. `None` is the missing-marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
}

impl ColumnData {
    fn from_column(column: &Column) -> Result<Self> {
        let data = match column.dtype() {
            DataType::Float64 => ColumnData::Numeric(column.f64()?.into_iter().collect()),
            DataType::String => ColumnData::Text(
                column
                    .str()?
                    .into_iter()
                    .map(|v| v.map(|s| s.to_string()))
                    .collect(),
            ),
            DataType::Boolean => ColumnData::Boolean(column.bool()?.into_iter().collect()),
            other => {
                return Err(PrepError::UnsupportedColumnType {
                    column: column.name().to_string(),
                    dtype: other.to_string(),
                })
            }
        };
        Ok(data)
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            ColumnData::Numeric(values) => {
                let values: Vec<Option<f64>> = values
                    .into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect();
                Column::new(name.into(), values)
            }
            ColumnData::Text(values) => Column::new(name.into(), values),
            ColumnData::Boolean(values) => Column::new(name.into(), values),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
            ColumnData::Boolean(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Boolean(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Cell at `row` as a scalar, `None` when missing.
    pub fn get(&self, row: usize) -> Option<Scalar> {
        match self {
            ColumnData::Numeric(v) => v[row].map(Scalar::Numeric),
            ColumnData::Text(v) => v[row].clone().map(Scalar::Text),
            ColumnData::Boolean(v) => v[row].map(Scalar::Boolean),
        }
    }
}

/// Replace NaN and infinite values with nulls.
fn finite_only(column: Column) -> Result<Column> {
    let values = column.f64()?;
    if values.into_iter().flatten().all(f64::is_finite) {
        return Ok(column);
    }
    let cleaned: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(Column::new(column.name().clone(), cleaned))
}

/// Map a normalized dtype to its column kind.
fn kind_of(dtype: &DataType) -> Option<ColumnKind> {
    match dtype {
        DataType::Float64 => Some(ColumnKind::Numeric),
        DataType::String => Some(ColumnKind::Text),
        DataType::Boolean => Some(ColumnKind::Boolean),
        _ => None,
    }
}

/// Immutable snapshot of a dataset with typed columns.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    /// Build a table from a DataFrame, normalizing column types.
    ///
    /// Integer and float columns become `Float64`, all-null columns become
    /// text. Any other dtype is rejected with `UnsupportedColumnType`.
    /// NaN and infinite numeric cells are stored as missing.
    pub fn new(frame: DataFrame) -> Result<Self> {
        let mut columns: Vec<Column> = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            let dtype = column.dtype();
            let normalized = if kind_of(dtype).is_some() {
                column.clone()
            } else if dtype.is_primitive_numeric() {
                column.cast(&DataType::Float64)?
            } else if matches!(dtype, DataType::Null) {
                column.cast(&DataType::String)?
            } else {
                return Err(PrepError::UnsupportedColumnType {
                    column: column.name().to_string(),
                    dtype: dtype.to_string(),
                });
            };
            let normalized = if normalized.dtype() == &DataType::Float64 {
                finite_only(normalized)?
            } else {
                normalized
            };
            columns.push(normalized);
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame
            .get_columns()
            .iter()
            .any(|c| c.name().as_str() == name)
    }

    /// Column names paired with their kinds, in table order.
    pub fn schema(&self) -> Vec<(String, ColumnKind)> {
        self.frame
            .get_columns()
            .iter()
            .filter_map(|c| kind_of(c.dtype()).map(|k| (c.name().to_string(), k)))
            .collect()
    }

    pub fn kind(&self, name: &str) -> Result<ColumnKind> {
        let column = self.raw_column(name)?;
        kind_of(column.dtype()).ok_or_else(|| PrepError::UnsupportedColumnType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        })
    }

    /// Names of all numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.schema()
            .into_iter()
            .filter(|(_, kind)| *kind == ColumnKind::Numeric)
            .map(|(name, _)| name)
            .collect()
    }

    /// Materialize one column's values.
    pub fn column(&self, name: &str) -> Result<ColumnData> {
        ColumnData::from_column(self.raw_column(name)?)
    }

    /// Missing cells in a column, read from the null bitmap.
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.raw_column(name)?.null_count())
    }

    /// Numeric values of a column; fails if the column is not numeric.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        match self.column(name)? {
            ColumnData::Numeric(values) => Ok(values),
            other => Err(PrepError::TypeMismatch {
                column: name.to_string(),
                expected: ColumnKind::Numeric.to_string(),
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Project onto the named columns, in the given order.
    ///
    /// Unlike a lenient projection, every name must exist.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if columns.iter().any(|c: &Column| c.name().as_str() == name) {
                continue;
            }
            columns.push(self.raw_column(name)?.clone());
        }
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Ensure every name exists, reporting the first missing one.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names.iter().find(|n| !self.has_column(n.as_ref())) {
            Some(missing) => Err(PrepError::column_not_found(missing.as_ref())),
            None => Ok(()),
        }
    }

    pub(crate) fn without_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        self.require_columns(names)?;
        let columns: Vec<Column> = self
            .frame
            .get_columns()
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name().as_str()))
            .cloned()
            .collect();
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Replace the named columns with new data, keeping column order.
    pub(crate) fn with_replaced(&self, replacements: Vec<(String, ColumnData)>) -> Result<Self> {
        let mut columns: Vec<Column> = self.frame.get_columns().to_vec();
        for (name, data) in replacements {
            let idx = columns
                .iter()
                .position(|c| c.name().as_str() == name)
                .ok_or_else(|| PrepError::column_not_found(&name))?;
            if data.len() != self.height() {
                return Err(PrepError::invalid_argument(format!(
                    "replacement for '{}' has {} rows, table has {}",
                    name,
                    data.len(),
                    self.height()
                )));
            }
            columns[idx] = data.into_column(&name);
        }
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Remove the inclusive row range `start..=end`.
    pub(crate) fn without_rows(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end >= self.height() {
            return Err(PrepError::invalid_argument(format!(
                "row range {}..={} is outside 0..{}",
                start,
                end,
                self.height()
            )));
        }
        let head = self.frame.slice(0, start);
        let tail = self.frame.slice((end + 1) as i64, self.height() - end - 1);
        Ok(Self {
            frame: head.vstack(&tail)?,
        })
    }

    fn raw_column(&self, name: &str) -> Result<&Column> {
        self.frame
            .get_columns()
            .iter()
            .find(|c| c.name().as_str() == name)
            .ok_or_else(|| PrepError::column_not_found(name))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl TryFrom<DataFrame> for Table {
    type Error = PrepError;

    fn try_from(frame: DataFrame) -> Result<Self> {
        Table::new(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let df = df! {
            "age" => [Some(31i32), None, Some(45)],
            "name" => [Some("Ann"), Some("Bo"), None],
            "member" => [true, false, true],
        }
        .unwrap();
        Table::new(df).unwrap()
    }

    #[test]
    fn test_integer_columns_become_numeric() {
        let table = sample();
        assert_eq!(table.kind("age").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.frame().column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            table.numeric_values("age").unwrap(),
            vec![Some(31.0), None, Some(45.0)]
        );
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = sample().schema();
        assert_eq!(
            schema,
            vec![
                ("age".to_string(), ColumnKind::Numeric),
                ("name".to_string(), ColumnKind::Text),
                ("member".to_string(), ColumnKind::Boolean),
            ]
        );
    }

    #[test]
    fn test_select_requires_every_column() {
        let table = sample();
        let selected = table.select(&["member", "age"]).unwrap();
        assert_eq!(selected.column_names(), vec!["member", "age"]);

        let err = table.select(&["age", "nope"]).unwrap_err();
        assert!(matches!(err, PrepError::ColumnNotFound { name } if name == "nope"));
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let err = sample().numeric_values("name").unwrap_err();
        assert!(matches!(err, PrepError::TypeMismatch { .. }));
    }

    #[test]
    fn test_without_rows_keeps_order() {
        let table = sample();
        let trimmed = table.without_rows(0, 0).unwrap();
        assert_eq!(trimmed.height(), 2);
        assert_eq!(trimmed.numeric_values("age").unwrap(), vec![None, Some(45.0)]);
        // Original untouched
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_without_rows_out_of_bounds() {
        let table = sample();
        assert!(table.without_rows(1, 3).is_err());
        assert!(table.without_rows(2, 1).is_err());
    }

    #[test]
    fn test_scalar_parse() {
        assert_eq!(Scalar::parse("0"), Scalar::Numeric(0.0));
        assert_eq!(Scalar::parse("true"), Scalar::Boolean(true));
        assert_eq!(Scalar::parse("n/a"), Scalar::Text("n/a".to_string()));
    }

    #[test]
    fn test_all_null_column_becomes_text() {
        let df = DataFrame::new(vec![Column::full_null(
            "empty".into(),
            3,
            &DataType::Null,
        )])
        .unwrap();
        let table = Table::new(df).unwrap();
        assert_eq!(table.kind("empty").unwrap(), ColumnKind::Text);
        assert_eq!(table.column("empty").unwrap().missing_count(), 3);
        assert_eq!(table.missing_count("empty").unwrap(), 3);
    }

    #[test]
    fn test_non_finite_values_become_missing() {
        let df = df! {
            "x" => [Some(1.0f64), Some(f64::NAN), None, Some(f64::INFINITY), Some(-f64::INFINITY)],
        }
        .unwrap();
        let table = Table::new(df).unwrap();

        assert_eq!(
            table.numeric_values("x").unwrap(),
            vec![Some(1.0), None, None, None, None]
        );
        assert_eq!(table.missing_count("x").unwrap(), 4);
        assert_eq!(table.column("x").unwrap().missing_count(), 4);
    }

    #[test]
    fn test_replaced_non_finite_values_become_missing() {
        let table = sample();
        let replaced = table
            .with_replaced(vec![(
                "age".to_string(),
                ColumnData::Numeric(vec![Some(f64::NAN), Some(2.0), Some(3.0)]),
            )])
            .unwrap();
        assert_eq!(replaced.missing_count("age").unwrap(), 1);
    }

    #[test]
    fn test_without_rows_edges() {
        let table = sample();
        let tail = table.without_rows(1, 2).unwrap();
        assert_eq!(tail.height(), 1);
        assert_eq!(tail.numeric_values("age").unwrap(), vec![Some(31.0)]);

        let all = table.without_rows(0, 2).unwrap();
        assert_eq!(all.height(), 0);
        assert_eq!(all.width(), 3);
    }
}
