//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tabprep::pipeline::Table;
use tempfile::TempDir;

/// Create a small mixed-type DataFrame with known characteristics
///
/// This DataFrame includes:
/// - `id`: Clean integer identifier (normalized to numeric)
/// - `age`: Numeric with two missing values
/// - `city`: Text with messy casing, whitespace and one missing value
/// - `active`: Boolean with one missing value
/// - `score`: Clean numeric with one large outlier in the last row
pub fn create_messy_dataframe() -> DataFrame {
    df! {
        "id" => [1i64, 2, 3, 4, 5, 6],
        "age" => [Some(25.0f64), None, Some(35.0), Some(45.0), None, Some(30.0)],
        "city" => [Some("  New York"), Some("BOSTON "), None, Some("new york"), Some("Chicago"), Some("boston")],
        "active" => [Some(true), Some(false), Some(true), None, Some(true), Some(false)],
        "score" => [10.0f64, 11.0, 9.5, 10.5, 10.0, 95.0],
    }
    .unwrap()
}

pub fn create_messy_table() -> Table {
    Table::new(create_messy_dataframe()).unwrap()
}

/// Create a table with a purely numeric layout for outlier tests
pub fn create_outlier_table() -> Table {
    Table::new(
        df! {
            "spike" => [1.0f64, 1.0, 1.0, 1.0, 100.0],
            "constant" => [7.0f64, 7.0, 7.0, 7.0, 7.0],
            "iqr" => [1.0f64, 2.0, 3.0, 4.0, 100.0],
            "label" => ["a", "b", "c", "d", "e"],
        }
        .unwrap(),
    )
    .unwrap()
}

/// Create a classification dataset where `signal` fully determines `target`
/// and `noise_*` columns are random.
pub fn create_importance_table(rows: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);

    let signal: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..10.0)).collect();
    let target: Vec<i32> = signal.iter().map(|&s| i32::from(s > 5.0)).collect();
    let noise_a: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
    let noise_b: Vec<f64> = (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect();

    let df = DataFrame::new(vec![
        Column::new("noise_a".into(), noise_a),
        Column::new("signal".into(), signal),
        Column::new("noise_b".into(), noise_b),
        Column::new("target".into(), target),
    ])
    .unwrap();
    Table::new(df).unwrap()
}

/// Create a larger random DataFrame for performance/stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(7);

    let columns: Vec<Column> = (0..cols)
        .map(|i| {
            let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
            Column::new(format!("feature_{}", i).into(), values)
        })
        .collect();

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a Table has expected shape
pub fn assert_shape(table: &Table, expected_rows: usize, expected_cols: usize) {
    assert_eq!(
        table.height(),
        expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows,
        table.height()
    );
    assert_eq!(
        table.width(),
        expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols,
        table.width()
    );
}

/// Assert that a Table contains specific columns
pub fn assert_has_columns(table: &Table, expected_cols: &[&str]) {
    let actual_cols = table.column_names();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a Table does NOT contain specific columns
pub fn assert_missing_columns(table: &Table, unexpected_cols: &[&str]) {
    let actual_cols = table.column_names();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
