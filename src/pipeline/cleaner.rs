//! Mutation-tracked cleaning session
//!
//! A [`Cleaner`] owns one table lineage: the origin table, the current version
//! and the log of every mutation applied in between. Each operation validates
//! its input against the current table, builds a fully resolved [`Mutation`],
//! applies it and only then appends to the log, so a failed call leaves both
//! the table and the log untouched.

use tracing::{debug, info};

use super::missing::{resolve_fill_values, FillValue};
use super::mutation::{replace_values, text_values, Mutation, MutationLog, MutationRecord};
use super::table::{Scalar, Table};
use super::text::TextCleaning;
use crate::error::{PrepError, Result};

/// Cleaning session bound to a single table lineage.
#[derive(Debug, Clone)]
pub struct Cleaner {
    original: Table,
    current: Table,
    log: MutationLog,
}

impl Cleaner {
    pub fn new(table: Table) -> Self {
        Self {
            original: table.clone(),
            current: table,
            log: MutationLog::new(),
        }
    }

    /// Current version of the table.
    pub fn table(&self) -> &Table {
        &self.current
    }

    /// Table the session started from.
    pub fn original(&self) -> &Table {
        &self.original
    }

    pub fn log(&self) -> &MutationLog {
        &self.log
    }

    /// End the session, keeping the cleaned table.
    pub fn into_table(self) -> Table {
        self.current
    }

    /// Remove the named columns.
    ///
    /// Every name must exist; if any is missing nothing is removed. At least
    /// one column must remain.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Table> {
        if names.is_empty() {
            return Err(PrepError::invalid_argument("no columns given to drop"));
        }
        self.current.require_columns(names)?;

        let mut columns: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !columns.iter().any(|c| c == name.as_ref()) {
                columns.push(name.as_ref().to_string());
            }
        }
        if columns.len() == self.current.width() {
            return Err(PrepError::invalid_argument(
                "cannot drop every column of the table",
            ));
        }

        self.commit(Mutation::DropColumns { columns })
    }

    /// Fill missing cells with a scalar or a per-column strategy.
    ///
    /// The record stores the value actually used for each column.
    pub fn fill_missing_values(&mut self, fill: impl Into<FillValue>) -> Result<Table> {
        let fill = fill.into();
        let fills = resolve_fill_values(&self.current, &fill)?;
        debug!(columns = fills.len(), ?fill, "resolved fill values");
        self.commit(Mutation::FillMissing { fills })
    }

    /// Normalize a text column: strip control characters, trim, lowercase.
    pub fn clean_column(&mut self, name: &str) -> Result<Table> {
        self.clean_column_with(name, TextCleaning::default())
    }

    /// Normalize a text column with explicit options.
    pub fn clean_column_with(&mut self, name: &str, options: TextCleaning) -> Result<Table> {
        text_values(&self.current, name)?;
        self.commit(Mutation::CleanText {
            column: name.to_string(),
            options,
        })
    }

    /// Remove rows `start..=end`.
    pub fn drop_rows(&mut self, start: usize, end: usize) -> Result<Table> {
        if start > end || end >= self.current.height() {
            return Err(PrepError::invalid_argument(format!(
                "row range {}..={} must lie within 0..{}",
                start,
                end,
                self.current.height()
            )));
        }
        self.commit(Mutation::DropRows { start, end })
    }

    /// Replace every cell equal to `search` in `column` with `replacement`.
    pub fn search_and_replace(
        &mut self,
        column: &str,
        search: impl Into<Scalar>,
        replacement: impl Into<Scalar>,
    ) -> Result<Table> {
        let search = search.into();
        let replacement = replacement.into();
        let (_, replaced) = replace_values(&self.current, column, &search, &replacement)?;
        if replaced == 0 {
            info!(column, %search, "No occurrences found");
        }
        self.commit(Mutation::ReplaceValues {
            column: column.to_string(),
            search,
            replacement,
            replaced,
        })
    }

    /// Ordered change records of this session. Pure read.
    pub fn show_changes_log(&self) -> &[MutationRecord] {
        self.log.records()
    }

    /// Rebuild the current table from the origin and the log.
    pub fn replay(&self) -> Result<Table> {
        self.log.replay(&self.original)
    }

    fn commit(&mut self, mutation: Mutation) -> Result<Table> {
        let next = mutation.apply(&self.current)?;
        let record = self.log.append(mutation, &self.current);
        info!(
            sequence = record.sequence,
            kind = %record.kind(),
            "{}",
            record.mutation.describe()
        );
        self.current = next;
        Ok(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::MutationKind;
    use polars::prelude::*;

    fn table() -> Table {
        Table::new(
            df! {
                "a" => [Some(1.0f64), None, Some(3.0)],
                "b" => [Some(" X "), Some("y"), None],
                "c" => [true, false, true],
            }
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_drop_columns_is_atomic() {
        let mut cleaner = Cleaner::new(table());
        let err = cleaner.drop_columns(&["a", "missing"]).unwrap_err();

        assert!(matches!(err, PrepError::ColumnNotFound { name } if name == "missing"));
        assert_eq!(cleaner.table().width(), 3);
        assert!(cleaner.show_changes_log().is_empty());
    }

    #[test]
    fn test_drop_columns_collapses_duplicates() {
        let mut cleaner = Cleaner::new(table());
        let result = cleaner.drop_columns(&["a", "a"]).unwrap();

        assert_eq!(result.column_names(), vec!["b", "c"]);
        assert_eq!(cleaner.show_changes_log()[0].columns, vec!["a"]);
    }

    #[test]
    fn test_original_is_never_modified() {
        let mut cleaner = Cleaner::new(table());
        cleaner.drop_columns(&["c"]).unwrap();
        cleaner.fill_missing_values(FillValue::Strategy).unwrap();

        assert_eq!(cleaner.original(), &table());
        assert_ne!(cleaner.table(), &table());
    }

    #[test]
    fn test_clean_column_rejects_non_text() {
        let mut cleaner = Cleaner::new(table());
        let err = cleaner.clean_column("a").unwrap_err();
        assert!(matches!(err, PrepError::TypeMismatch { .. }));
        assert!(cleaner.show_changes_log().is_empty());
    }

    #[test]
    fn test_log_kinds_in_order() {
        let mut cleaner = Cleaner::new(table());
        cleaner.clean_column("b").unwrap();
        cleaner.drop_rows(2, 2).unwrap();
        cleaner.search_and_replace("b", "x", "z").unwrap();

        let kinds: Vec<MutationKind> = cleaner.show_changes_log().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                MutationKind::CleanText,
                MutationKind::DropRows,
                MutationKind::ReplaceValues
            ]
        );
        assert_eq!(
            cleaner.table().column("b").unwrap(),
            crate::pipeline::ColumnData::Text(vec![Some("z".to_string()), Some("y".to_string())])
        );
        assert_eq!(cleaner.replay().unwrap(), *cleaner.table());
    }

    #[test]
    fn test_drop_every_column_is_rejected() {
        let mut cleaner = Cleaner::new(table());
        let names = cleaner.table().column_names();
        let err = cleaner.drop_columns(&names).unwrap_err();
        assert!(matches!(err, PrepError::InvalidArgument(_)));
        assert_eq!(cleaner.table(), &table());
        assert!(cleaner.show_changes_log().is_empty());
    }

    #[test]
    fn test_drop_rows_out_of_range() {
        let mut cleaner = Cleaner::new(table());
        assert!(matches!(
            cleaner.drop_rows(1, 5),
            Err(PrepError::InvalidArgument(_))
        ));
        assert!(cleaner.show_changes_log().is_empty());
    }
}
