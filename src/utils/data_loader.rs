//! Data loading utilities

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Marker the house price CSV files use for a missing value
pub const NA_MARKER: &str = "NA";

/// Data loader for the supported file formats
pub struct DataLoader {
    /// Rows used for schema inference
    infer_schema_length: usize,
    /// Token read as null
    null_value: Option<String>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
            null_value: Some(NA_MARKER.to_string()),
        }
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n.max(1);
        self
    }

    /// Set (or clear) the token that is read as null
    pub fn with_null_value(mut self, token: Option<&str>) -> Self {
        self.null_value = token.map(str::to_string);
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut parse_opts = CsvParseOptions::default();
        if let Some(token) = &self.null_value {
            parse_opts = parse_opts
                .with_null_values(Some(NullValues::AllColumnsSingle(token.as_str().into())));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::DataError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
        Ok(df)
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| PipelineError::DataError(e.to_string()))
    }

    /// Load a JSON file
    pub fn load_json(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;
        JsonReader::new(file)
            .finish()
            .map_err(|e| PipelineError::DataError(e.to_string()))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "parquet" | "pq" => self.load_parquet(path),
            "json" | "jsonl" => self.load_json(path),
            _ => self.load_csv(path),
        }
    }

    /// Read the header and count data rows of a CSV without parsing values
    pub fn get_file_info(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref();
        let file_size = std::fs::metadata(path)?.len();
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();

        let header = lines.next().transpose()?.unwrap_or_default();
        let columns: Vec<String> = header
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let n_rows = lines.count();

        Ok(FileInfo {
            path: path.display().to_string(),
            file_size,
            n_rows,
            columns,
        })
    }
}

/// File information
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub file_size: u64,
    pub n_rows: usize,
    pub columns: Vec<String>,
}

/// Write a DataFrame as CSV with a header row
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| PipelineError::DataError(e.to_string()))
}
