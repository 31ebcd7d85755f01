//! Cell values and single-neighborhood records.

use polars::prelude::*;
use std::fmt;

/// Owned scalar taken out of a DataFrame cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => CellValue::Null,
            AnyValue::Int8(v) => CellValue::Int(v as i64),
            AnyValue::Int16(v) => CellValue::Int(v as i64),
            AnyValue::Int32(v) => CellValue::Int(v as i64),
            AnyValue::Int64(v) => CellValue::Int(v),
            AnyValue::UInt8(v) => CellValue::Int(v as i64),
            AnyValue::UInt16(v) => CellValue::Int(v as i64),
            AnyValue::UInt32(v) => CellValue::Int(v as i64),
            AnyValue::UInt64(v) => CellValue::Int(v as i64),
            AnyValue::Float32(v) => CellValue::Float(v as f64),
            AnyValue::Float64(v) => CellValue::Float(v),
            AnyValue::String(s) => CellValue::Text(s.to_string()),
            AnyValue::StringOwned(s) => CellValue::Text(s.to_string()),
            other => CellValue::Text(other.to_string().trim_matches('"').to_string()),
        }
    }

    /// Numeric reading of the cell. Percentage strings such as `"87.50%"`
    /// yield `87.5`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(v) => write!(f, "{}", v),
            // Integral floats keep a trailing ".0" so they read as floats.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the dataset, columns kept in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodRecord {
    pub name: String,
    pub fields: Vec<(String, CellValue)>,
}

impl NeighborhoodRecord {
    /// Build the record for row `idx` of `df`.
    pub fn from_row(df: &DataFrame, idx: usize, name: String) -> PolarsResult<Self> {
        let mut fields = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let value = CellValue::from_any(column.get(idx)?);
            fields.push((column.name().to_string(), value));
        }
        Ok(Self { name, fields })
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Text of a field, empty when the column is absent or null.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }
}
