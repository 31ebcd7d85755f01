//! Display Formatter Module
//! Rewrites proportion columns as percentage strings and derives the
//! Brazilian-locale currency column from the raw income column.

use crate::config::DashboardConfig;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Applies the one-time display formatting right after load.
pub struct DataFormatter;

impl DataFormatter {
    /// Format the freshly loaded dataset. Must run exactly once per load.
    pub fn format(mut df: DataFrame, config: &DashboardConfig) -> Result<DataFrame, FormatError> {
        for name in &config.percent_columns {
            let Ok(column) = df.column(name) else {
                debug!(column = %name, "percentage column absent, skipping");
                continue;
            };
            let values = column.cast(&DataType::Float64)?;
            let formatted: Vec<Option<String>> = values
                .f64()?
                .into_iter()
                .map(|v| v.map(Self::percentage))
                .collect();
            df.with_column(Column::new(name.as_str().into(), formatted))?;
        }

        let income = df.column(&config.income_column).ok().cloned();
        if let Some(income) = income {
            let values = income.cast(&DataType::Float64)?;
            let formatted: Vec<Option<String>> = values
                .f64()?
                .into_iter()
                .map(|v| v.map(Self::currency_brl))
                .collect();
            df.with_column(Column::new(
                config.income_display_column.as_str().into(),
                formatted,
            ))?;
        } else {
            debug!(column = %config.income_column, "income column absent, skipping");
        }

        Ok(df)
    }

    /// `0.875` -> `"87.50%"`
    pub fn percentage(fraction: f64) -> String {
        format!("{:.2}%", fraction * 100.0)
    }

    /// `1234.5` -> `"R$ 1.234,50"`
    pub fn currency_brl(value: f64) -> String {
        if !value.is_finite() {
            return format!("R$ {}", value);
        }

        let fixed = format!("{:.2}", value.abs());
        let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("R$ {}{},{}", sign, grouped, dec_part)
    }
}
