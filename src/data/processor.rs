//! Data Processor Module
//! Filtering, sorting, row selection and column discovery over the
//! formatted dataset. Every operation returns a new view.

use crate::data::{CellValue, NeighborhoodRecord};
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
}

const SORT_KEY: &str = "__sort_key";

/// Plain-text rendition of a DataFrame for the table widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Handles filtering and reordering of the neighborhood table.
pub struct DataProcessor;

impl DataProcessor {
    /// All column names in dataset order.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(df: &DataFrame, column: &str) -> bool {
        df.column(column).is_ok()
    }

    /// Display key of every cell in `column`, in row order.
    pub fn column_keys(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::UnknownColumn(column.to_string()))?;

        let mut keys = Vec::with_capacity(series.len());
        for i in 0..series.len() {
            keys.push(CellValue::from_any(series.get(i)?).to_string());
        }
        Ok(keys)
    }

    /// Distinct values of a column in order of first appearance.
    pub fn distinct_values(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let mut seen = HashSet::new();
        Ok(Self::column_keys(df, column)?
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect())
    }

    /// Keep rows whose `column` value is one of `selected`.
    ///
    /// An empty selection means "no filtering" and returns the full table.
    pub fn filter_by_values(
        df: &DataFrame,
        column: &str,
        selected: &[String],
    ) -> Result<DataFrame, ProcessorError> {
        if selected.is_empty() {
            debug!(column, "empty filter selection, showing all rows");
            return Ok(df.clone());
        }

        let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
        let mask: Vec<bool> = Self::column_keys(df, column)?
            .iter()
            .map(|key| wanted.contains(key.as_str()))
            .collect();
        let mask = BooleanChunked::from_slice("mask".into(), &mask);

        Ok(df.filter(&mask)?)
    }

    /// Stable sort by one column. Nulls go last; an absent column leaves the
    /// order unchanged.
    pub fn sort_by(df: &DataFrame, column: &str, ascending: bool) -> Result<DataFrame, ProcessorError> {
        if !Self::has_column(df, column) {
            warn!(column, "sort column absent, keeping current order");
            return Ok(df.clone());
        }

        let options = SortMultipleOptions::default()
            .with_order_descending(!ascending)
            .with_nulls_last(true)
            .with_maintain_order(true);

        let values = df.column(column)?;
        if !values.dtype().is_float() {
            return Ok(df.sort([column], options)?);
        }

        // NaN sorts as the largest float; key on a copy where it is null.
        let key: Float64Chunked = values
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        let mut keyed = df.clone();
        keyed.with_column(key.with_name(SORT_KEY.into()).into_series())?;
        let mut sorted = keyed.sort([SORT_KEY], options)?;
        sorted.drop_in_place(SORT_KEY)?;
        Ok(sorted)
    }

    /// First row whose `name_column` equals `name`.
    pub fn select_row(
        df: &DataFrame,
        name_column: &str,
        name: &str,
    ) -> Result<Option<NeighborhoodRecord>, ProcessorError> {
        let keys = Self::column_keys(df, name_column)?;
        match keys.iter().position(|key| key == name) {
            Some(idx) => Ok(Some(NeighborhoodRecord::from_row(df, idx, name.to_string())?)),
            None => Ok(None),
        }
    }

    /// Columns whose name contains `marker`, in dataset order.
    pub fn group_columns(df: &DataFrame, marker: &str) -> Vec<String> {
        df.get_column_names()
            .iter()
            .filter(|name| name.contains(marker))
            .map(|name| name.to_string())
            .collect()
    }

    /// Numeric values of a column (nulls and non-numeric text become `None`).
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::UnknownColumn(column.to_string()))?;
        let values = series.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Table for display: the raw income column is hidden and the formatted
    /// currency column takes its name.
    pub fn display_table(
        view: &DataFrame,
        income_column: &str,
        income_display_column: &str,
    ) -> Result<TableView, ProcessorError> {
        let mut table = view.clone();
        if Self::has_column(&table, income_column) && Self::has_column(&table, income_display_column) {
            table = table.drop(income_column)?;
            table.rename(income_display_column, income_column.into())?;
        }

        let headers = Self::column_names(&table);
        let mut rows = vec![Vec::with_capacity(headers.len()); table.height()];
        for column in table.get_columns() {
            for (i, row) in rows.iter_mut().enumerate() {
                row.push(CellValue::from_any(column.get(i)?).to_string());
            }
        }

        Ok(TableView { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::new("NOME_BAIRRO".into(), ["Centro", "Aldeota", "Benfica", "Meireles"]),
            Column::new("REGIAO".into(), ["Norte", "Sul", "Norte", "Leste"]),
            Column::new("DENSIDADE".into(), [1500.0, 900.0, 1500.0, 300.0]),
            Column::new("COR_BRANCA".into(), [10i64, 20, 30, 40]),
            Column::new("COR_PARDA".into(), [5i64, 6, 7, 8]),
            Column::new("RESP_RENDA_MEDIA".into(), [2500.5, 3000.0, 1200.0, 8000.0]),
            Column::new(
                "RESP_RENDA_FORMATADA".into(),
                ["R$ 2.500,50", "R$ 3.000,00", "R$ 1.200,00", "R$ 8.000,00"],
            ),
        ])
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        DataProcessor::column_keys(df, "NOME_BAIRRO").unwrap()
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let values = DataProcessor::distinct_values(&sample(), "REGIAO").unwrap();
        assert_eq!(values, vec!["Norte", "Sul", "Leste"]);
    }

    #[test]
    fn filter_with_all_values_is_identity() {
        let df = sample();
        let all = DataProcessor::distinct_values(&df, "REGIAO").unwrap();
        let filtered = DataProcessor::filter_by_values(&df, "REGIAO", &all).unwrap();
        assert!(filtered.equals(&df));
    }

    #[test]
    fn filter_with_no_values_falls_back_to_full_table() {
        let df = sample();
        let filtered = DataProcessor::filter_by_values(&df, "REGIAO", &[]).unwrap();
        assert_eq!(filtered.height(), 4);
        assert!(filtered.equals(&df));
    }

    #[test]
    fn filter_keeps_matching_rows_in_order() {
        let df = sample();
        let filtered =
            DataProcessor::filter_by_values(&df, "REGIAO", &["Norte".to_string()]).unwrap();
        assert_eq!(names(&filtered), vec!["Centro", "Benfica"]);
    }

    #[test]
    fn filter_on_numeric_column_uses_display_keys() {
        let df = sample();
        let filtered =
            DataProcessor::filter_by_values(&df, "DENSIDADE", &["1500.0".to_string()]).unwrap();
        assert_eq!(names(&filtered), vec!["Centro", "Benfica"]);
    }

    #[test]
    fn filter_on_unknown_column_errors() {
        let result = DataProcessor::filter_by_values(&sample(), "NOPE", &["x".to_string()]);
        assert!(matches!(result, Err(ProcessorError::UnknownColumn(_))));
    }

    #[test]
    fn name_sort_directions_are_reverses() {
        let df = sample();
        let asc = names(&DataProcessor::sort_by(&df, "NOME_BAIRRO", true).unwrap());
        let mut desc = names(&DataProcessor::sort_by(&df, "NOME_BAIRRO", false).unwrap());
        assert_eq!(asc, vec!["Aldeota", "Benfica", "Centro", "Meireles"]);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let df = sample();
        let sorted = DataProcessor::sort_by(&df, "DENSIDADE", false).unwrap();
        // Centro and Benfica tie at 1500.0 and keep their original order.
        assert_eq!(names(&sorted), vec!["Centro", "Benfica", "Aldeota", "Meireles"]);
    }

    #[test]
    fn nan_values_sort_last_in_both_directions() {
        let df = DataFrame::new(vec![
            Column::new("NOME_BAIRRO".into(), ["A", "B", "C"]),
            Column::new("EDUC_ANALFABETISMO".into(), [f64::NAN, 5.0, 9.0]),
        ])
        .unwrap();

        let desc = DataProcessor::sort_by(&df, "EDUC_ANALFABETISMO", false).unwrap();
        assert_eq!(names(&desc), vec!["C", "B", "A"]);
        let asc = DataProcessor::sort_by(&df, "EDUC_ANALFABETISMO", true).unwrap();
        assert_eq!(names(&asc), vec!["B", "C", "A"]);

        // Values are untouched and the helper key is gone.
        assert_eq!(desc.width(), 2);
        let values = desc.column("EDUC_ANALFABETISMO").unwrap();
        assert!(values.f64().unwrap().get(2).unwrap().is_nan());
    }

    #[test]
    fn sort_on_absent_column_keeps_order() {
        let df = sample();
        let sorted = DataProcessor::sort_by(&df, "EDUC_ANALFABETISMO", true).unwrap();
        assert!(sorted.equals(&df));
    }

    #[test]
    fn select_row_returns_first_match() {
        let df = sample();
        let record = DataProcessor::select_row(&df, "NOME_BAIRRO", "Benfica")
            .unwrap()
            .unwrap();
        assert_eq!(record.number("COR_BRANCA"), Some(30.0));
        assert!(DataProcessor::select_row(&df, "NOME_BAIRRO", "Nenhum")
            .unwrap()
            .is_none());
    }

    #[test]
    fn group_columns_follow_the_dataset() {
        let mut df = sample();
        assert_eq!(
            DataProcessor::group_columns(&df, "COR_"),
            vec!["COR_BRANCA", "COR_PARDA"]
        );

        df.with_column(Column::new("COR_PRETA".into(), [1i64, 2, 3, 4]))
            .unwrap();
        let _ = df.drop_in_place("COR_BRANCA").unwrap();
        assert_eq!(
            DataProcessor::group_columns(&df, "COR_"),
            vec!["COR_PARDA", "COR_PRETA"]
        );
        assert!(DataProcessor::group_columns(&df, "DOM_").is_empty());
    }

    #[test]
    fn display_table_shows_formatted_income_under_raw_name() {
        let table =
            DataProcessor::display_table(&sample(), "RESP_RENDA_MEDIA", "RESP_RENDA_FORMATADA")
                .unwrap();

        assert!(!table.headers.contains(&"RESP_RENDA_FORMATADA".to_string()));
        let idx = table
            .headers
            .iter()
            .position(|h| h == "RESP_RENDA_MEDIA")
            .unwrap();
        assert_eq!(table.rows[0][idx], "R$ 2.500,50");
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[1][0], "Aldeota");
    }
}
