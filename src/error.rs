//! Error types for table cleaning and analysis.
//!
//! Every operation on a [`Table`](crate::pipeline::Table) fails fast with one of
//! these variants. Nothing is retried and nothing is partially applied.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors produced by tabprep operations.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A referenced column does not exist in the current table.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// An operation was applied to a column of an incompatible kind.
    #[error("column '{column}' is {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// A parameter is outside its allowed domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsupported outlier-detection method.
    #[error("unknown outlier method '{method}', expected 'zscore' or 'iqr'")]
    InvalidMethod { method: String },

    /// Too few usable values or rows for the requested computation.
    #[error("need at least {required} usable rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Column dtype has no tabprep column kind.
    #[error("column '{column}' has unsupported type {dtype}")]
    UnsupportedColumnType { column: String, dtype: String },

    /// Underlying polars failure.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PrepError>;

impl PrepError {
    pub(crate) fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PrepError::column_not_found("age");
        assert_eq!(err.to_string(), "column 'age' not found");

        let err = PrepError::TypeMismatch {
            column: "name".to_string(),
            expected: "text".to_string(),
            actual: "numeric".to_string(),
        };
        assert_eq!(err.to_string(), "column 'name' is numeric, expected text");

        let err = PrepError::InvalidMethod {
            method: "mad".to_string(),
        };
        assert!(err.to_string().contains("'mad'"));

        let err = PrepError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "need at least 2 usable rows, got 1");
    }
}
