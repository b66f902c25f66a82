//! Dataset loading and saving for CSV, Parquet and JSON files

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use super::table::Table;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
    Json,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Parquet => write!(f, "parquet"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            "json" => Ok(FileFormat::Json),
            _ => Err(format!(
                "Unsupported file format: '{}'. Supported formats: csv, parquet, json",
                s
            )),
        }
    }
}

impl FileFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        extension
            .parse()
            .map_err(|_| {
                anyhow::anyhow!(
                    "Unsupported file extension '{}' for file: {}",
                    extension,
                    path.display()
                )
            })
    }
}

/// Load a dataset into a [`Table`], inferring the format from the extension
/// unless one is given.
///
/// `infer_schema_length` applies to CSV only; 0 scans the whole file.
pub fn load_table(
    path: &Path,
    format: Option<FileFormat>,
    infer_schema_length: usize,
) -> Result<Table> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let format = match format {
        Some(format) => format,
        None => FileFormat::from_path(path)?,
    };

    let df = match format {
        FileFormat::Csv => {
            let schema_length = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            LazyCsvReader::new(path)
                .with_infer_schema_length(schema_length)
                .finish()
                .and_then(|lf| lf.collect())
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        FileFormat::Parquet => LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        FileFormat::Json => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
            JsonReader::new(file)
                .finish()
                .with_context(|| format!("Failed to load JSON file: {}", path.display()))?
        }
    };

    let table = Table::new(df)
        .with_context(|| format!("Unsupported column types in {}", path.display()))?;
    info!(
        path = %path.display(),
        %format,
        rows = table.height(),
        columns = table.width(),
        "Data loaded"
    );
    Ok(table)
}

/// Save a table to file (CSV, Parquet or JSON based on extension).
pub fn save_table(table: &Table, path: &Path) -> Result<()> {
    let mut df = table.frame().clone();
    let format = FileFormat::from_path(path)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    match format {
        FileFormat::Csv => CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?,
        FileFormat::Parquet => {
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        FileFormat::Json => JsonWriter::new(&mut file)
            .with_json_format(JsonFormat::Json)
            .finish(&mut df)
            .with_context(|| format!("Failed to write JSON file: {}", path.display()))?,
    }

    info!(path = %path.display(), %format, "Data saved");
    Ok(())
}
