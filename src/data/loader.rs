//! Spreadsheet Loader Module
//! Reads the neighborhood spreadsheet (xlsx/xls/ods via calamine, csv via
//! Polars) into a DataFrame and tracks the file's modification time.

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Failed to load table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),
    #[error("Spreadsheet has no sheets or no header row")]
    NoData,
    #[error("Required column '{0}' not found")]
    MissingColumn(String),
}

/// Floats at or beyond 2^53 no longer hold every integer exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Inferred type of a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Text,
}

/// Handles loading the dataset file and detecting later changes to it.
pub struct DataLoader {
    file_path: PathBuf,
    modified: Option<SystemTime>,
}

impl DataLoader {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            modified: None,
        }
    }

    /// Get file path.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Load the file, checking that `required_column` is present.
    pub fn load(&mut self, required_column: &str) -> Result<DataFrame, LoaderError> {
        let modified = Self::modified_time(&self.file_path)?;

        let extension = self
            .file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let df = match extension.as_str() {
            "csv" => Self::load_csv(&self.file_path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::load_spreadsheet(&self.file_path)?,
            other => return Err(LoaderError::UnsupportedFormat(other.to_string())),
        };

        if df.column(required_column).is_err() {
            return Err(LoaderError::MissingColumn(required_column.to_string()));
        }

        info!(
            path = %self.file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "dataset loaded"
        );
        self.modified = Some(modified);
        Ok(df)
    }

    /// True when the file's modification time differs from the one seen at
    /// the last successful load.
    pub fn has_changed(&self) -> bool {
        match Self::modified_time(&self.file_path) {
            Ok(current) => self.modified != Some(current),
            Err(e) => {
                debug!(error = %e, "could not stat dataset file");
                false
            }
        }
    }

    fn modified_time(path: &Path) -> Result<SystemTime, LoaderError> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load a CSV file using Polars.
    fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Load the first sheet of a workbook.
    fn load_spreadsheet(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or(LoaderError::NoData)??;
        Self::range_to_dataframe(&range)
    }

    /// Convert a sheet range into a DataFrame. The first row holds the
    /// column names.
    pub(crate) fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, LoaderError> {
        let mut rows = range.rows();
        let header = rows.next().ok_or(LoaderError::NoData)?;
        let body: Vec<&[Data]> = rows.collect();

        let mut columns = Vec::with_capacity(header.len());
        for (idx, head) in header.iter().enumerate() {
            let name = match head {
                Data::Empty => format!("Unnamed: {}", idx),
                other => other.to_string(),
            };
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            columns.push(Self::build_column(&name, &cells));
        }

        Ok(DataFrame::new(columns)?)
    }

    fn infer_kind(cells: &[&Data]) -> CellKind {
        let mut kind = CellKind::Integer;
        for cell in cells {
            match cell {
                Data::Empty => {}
                Data::Int(_) => {}
                Data::Float(v) if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER => {}
                Data::Float(_) => kind = CellKind::Float,
                _ => return CellKind::Text,
            }
        }
        kind
    }

    fn build_column(name: &str, cells: &[&Data]) -> Column {
        match Self::infer_kind(cells) {
            CellKind::Integer => {
                let values: Vec<Option<i64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(v) => Some(*v),
                        Data::Float(v) => Some(*v as i64),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            CellKind::Float => {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(v) => Some(*v as f64),
                        Data::Float(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            CellKind::Text => {
                let values: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Empty => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                Column::new(name.into(), values)
            }
        }
    }
}
