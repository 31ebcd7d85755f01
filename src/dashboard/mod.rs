//! Dashboard module - the request handler
//!
//! `Dashboard::render` maps (dataset, widget state) to everything the page
//! shows: the filtered table, the neighborhood picker, the five
//! single-neighborhood panels and the three sorted comparison charts.

mod state;

pub use state::{DashboardState, FilterState, SortMenu};

use crate::charts::{ChartBuilder, ChartPanel, ComparisonColumns};
use crate::config::DashboardConfig;
use crate::data::{
    DataFormatter, DataLoader, DataProcessor, FormatError, LoaderError, ProcessorError, TableView,
};
use polars::prelude::*;
use thiserror::Error;
use tracing::info;

pub const PAGE_TITLE: &str = "📊 Visualização da Planilha Excel";
pub const EMPTY_VIEW_NOTICE: &str = "Nenhum bairro corresponde ao filtro selecionado.";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("Dataset has no columns")]
    NoColumns,
}

/// Filter panel contents with the effective selections.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterView {
    pub columns: Vec<String>,
    pub column: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

/// A sort menu followed by the comparison chart it orders.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSection {
    pub menu_id: &'static str,
    pub labels: Vec<String>,
    pub selected: usize,
    pub panel: ChartPanel,
}

/// Everything one render produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub filter: FilterView,
    pub table: TableView,
    pub neighborhoods: Vec<String>,
    pub neighborhood: Option<String>,
    /// Sex, age, race, household and coverage panels; empty when the
    /// filtered view has no neighborhood.
    pub neighborhood_panels: Vec<ChartPanel>,
    pub comparisons: Vec<ComparisonSection>,
}

impl DashboardView {
    /// Write the effective selections back so the widgets stay consistent.
    pub fn sync_state(&self, state: &mut DashboardState) {
        state.filter.column = Some(self.filter.column.clone());
        state.neighborhood = self.neighborhood.clone();
        if let [density, income, illiteracy] = self.comparisons.as_slice() {
            state.density_sort = density.selected;
            state.income_sort = income.selected;
            state.illiteracy_sort = illiteracy.selected;
        }
    }
}

/// Loaded, formatted dataset plus the configuration that names its columns.
pub struct Dashboard {
    config: DashboardConfig,
    loader: DataLoader,
    df: DataFrame,
    menus: [SortMenu; 3],
}

impl Dashboard {
    /// Load and format the configured file. Any failure here is fatal.
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        let mut loader = DataLoader::new(config.data_path.clone());
        let raw = loader.load(&config.name_column)?;
        let df = DataFormatter::format(raw, &config)?;
        Ok(Self::with_parts(config, loader, df))
    }

    /// Build from an already-loaded frame (formatting is applied here).
    pub fn from_frame(config: DashboardConfig, raw: DataFrame) -> Result<Self, DashboardError> {
        let loader = DataLoader::new(config.data_path.clone());
        let df = DataFormatter::format(raw, &config)?;
        Ok(Self::with_parts(config, loader, df))
    }

    fn with_parts(config: DashboardConfig, loader: DataLoader, df: DataFrame) -> Self {
        let menus = [
            SortMenu::density(&config),
            SortMenu::income(&config),
            SortMenu::illiteracy(&config),
        ];
        Self {
            config,
            loader,
            df,
            menus,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Reload when the file changed on disk. On failure the current dataset
    /// is kept.
    pub fn reload_if_changed(&mut self) -> Result<bool, DashboardError> {
        if !self.loader.has_changed() {
            return Ok(false);
        }

        info!(path = %self.loader.file_path().display(), "dataset changed on disk, reloading");
        let raw = self.loader.load(&self.config.name_column)?;
        self.df = DataFormatter::format(raw, &self.config)?;
        Ok(true)
    }

    /// Produce the page for the given widget state.
    pub fn render(&self, state: &DashboardState) -> Result<DashboardView, DashboardError> {
        let config = &self.config;

        // Filter stage
        let columns = DataProcessor::column_names(&self.df);
        let column = match state.filter.column.clone().filter(|c| columns.contains(c)) {
            Some(column) => column,
            None => columns.first().cloned().ok_or(DashboardError::NoColumns)?,
        };
        let options = DataProcessor::distinct_values(&self.df, &column)?;
        let mut selected = state
            .filter
            .selected
            .clone()
            .unwrap_or_else(|| options.clone());
        selected.retain(|v| options.contains(v));
        let view = DataProcessor::filter_by_values(&self.df, &column, &selected)?;

        let table = DataProcessor::display_table(
            &view,
            &config.income_column,
            &config.income_display_column,
        )?;

        // Selector stage
        let neighborhoods = DataProcessor::distinct_values(&view, &config.name_column)?;
        let neighborhood = state
            .neighborhood
            .clone()
            .filter(|n| neighborhoods.contains(n))
            .or_else(|| neighborhoods.first().cloned());

        let mut neighborhood_panels = Vec::new();
        if let Some(name) = &neighborhood {
            if let Some(record) = DataProcessor::select_row(&view, &config.name_column, name)? {
                neighborhood_panels.push(ChartBuilder::sex_pie(&record));
                neighborhood_panels.push(ChartBuilder::age_bar(&record));
                neighborhood_panels.push(ChartBuilder::race_pie(
                    &record,
                    &DataProcessor::group_columns(&self.df, &config.race_marker),
                ));
                neighborhood_panels.push(ChartBuilder::household_bar(
                    &record,
                    &DataProcessor::group_columns(&self.df, &config.household_marker),
                ));
                neighborhood_panels.push(ChartBuilder::coverage_bar(
                    &record,
                    &DataProcessor::group_columns(&self.df, &config.coverage_marker),
                ));
            }
        }

        // Sort stages, applied in page order on the same view
        let mut sorted = view;
        let choices = [state.density_sort, state.income_sort, state.illiteracy_sort];
        let metrics = [
            config.density_column.as_str(),
            config.income_column.as_str(),
            config.illiteracy_column.as_str(),
        ];
        let mut comparisons = Vec::with_capacity(self.menus.len());
        for (i, menu) in self.menus.iter().enumerate() {
            let (index, option) = menu.option(choices[i]);
            sorted = DataProcessor::sort_by(&sorted, &option.column, option.ascending)?;

            let chart_columns = ComparisonColumns {
                name: &config.name_column,
                metric: metrics[i],
            };
            let panel = match i {
                0 => ChartBuilder::density_bar(&sorted, &chart_columns)?,
                1 => ChartBuilder::income_bar(&sorted, &chart_columns)?,
                _ => ChartBuilder::illiteracy_bar(&sorted, &chart_columns)?,
            };
            comparisons.push(ComparisonSection {
                menu_id: menu.id,
                labels: menu.labels(),
                selected: index,
                panel,
            });
        }

        Ok(DashboardView {
            filter: FilterView {
                columns,
                column,
                options,
                selected,
            },
            table,
            neighborhoods,
            neighborhood,
            neighborhood_panels,
            comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::PanelBody;
    use std::time::{Duration, SystemTime};
    use tempfile::Builder;

    fn raw() -> DataFrame {
        DataFrame::new(vec![
            Column::new("NOME_BAIRRO".into(), ["Centro", "Aldeota", "Benfica"]),
            Column::new("REGIAO".into(), ["Norte", "Sul", "Norte"]),
            Column::new("POP_TOTAL_HOMEM".into(), [100i64, 200, 300]),
            Column::new("POP_TOTAL_MULHER".into(), [120i64, 210, 310]),
            Column::new("POP_TOTAL_RESIDENTE".into(), [220i64, 410, 610]),
            Column::new("DENSIDADE".into(), [1500.0, 900.0, 1200.0]),
            Column::new("PROP_LIXO/DOM".into(), [0.875, 0.5, 0.25]),
            Column::new("RESP_RENDA_MEDIA".into(), [2500.5, 4000.0, 1800.0]),
        ])
        .unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::from_frame(DashboardConfig::default(), raw()).unwrap()
    }

    fn write_csv(path: &std::path::Path, body: &str) {
        std::fs::write(path, body).unwrap();
    }

    fn bump_mtime(path: &std::path::Path, secs: u64) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs))
            .unwrap();
    }

    fn categories(section: &ComparisonSection) -> Vec<String> {
        section.panel.chart().unwrap().categories.clone()
    }

    #[test]
    fn initial_state_shows_everything() {
        let view = dashboard().render(&DashboardState::default()).unwrap();

        assert_eq!(view.filter.column, "NOME_BAIRRO");
        assert_eq!(view.filter.selected, view.filter.options);
        assert_eq!(view.table.rows.len(), 3);
        assert_eq!(view.neighborhood.as_deref(), Some("Centro"));
        assert_eq!(view.neighborhood_panels.len(), 5);
        assert_eq!(view.comparisons.len(), 3);
        assert_eq!(
            categories(&view.comparisons[0]),
            vec!["Aldeota", "Benfica", "Centro"]
        );
    }

    #[test]
    fn table_shows_formatted_values() {
        let view = dashboard().render(&DashboardState::default()).unwrap();
        let headers = &view.table.headers;

        let prop = headers.iter().position(|h| h == "PROP_LIXO/DOM").unwrap();
        let income = headers.iter().position(|h| h == "RESP_RENDA_MEDIA").unwrap();
        assert_eq!(view.table.rows[0][prop], "87.50%");
        assert_eq!(view.table.rows[0][income], "R$ 2.500,50");
        assert!(!headers.contains(&"RESP_RENDA_FORMATADA".to_string()));
    }

    #[test]
    fn filter_narrows_neighborhoods_and_snaps_selection() {
        let state = DashboardState {
            filter: FilterState {
                column: Some("REGIAO".to_string()),
                selected: Some(vec!["Sul".to_string()]),
            },
            neighborhood: Some("Centro".to_string()),
            ..Default::default()
        };
        let view = dashboard().render(&state).unwrap();

        assert_eq!(view.neighborhoods, vec!["Aldeota"]);
        assert_eq!(view.neighborhood.as_deref(), Some("Aldeota"));
        let sex = view.neighborhood_panels[0].chart().unwrap();
        assert_eq!(sex.values, vec![200.0, 210.0]);
    }

    #[test]
    fn empty_selection_falls_back_to_full_table() {
        let state = DashboardState {
            filter: FilterState {
                column: Some("REGIAO".to_string()),
                selected: Some(Vec::new()),
            },
            ..Default::default()
        };
        let view = dashboard().render(&state).unwrap();
        assert_eq!(view.table.rows.len(), 3);
        assert_eq!(view.neighborhoods.len(), 3);
    }

    #[test]
    fn empty_view_has_no_neighborhood_panels() {
        let empty = raw().head(Some(0));
        let dashboard = Dashboard::from_frame(DashboardConfig::default(), empty).unwrap();
        let view = dashboard.render(&DashboardState::default()).unwrap();

        assert!(view.neighborhood.is_none());
        assert!(view.neighborhood_panels.is_empty());
        assert!(view.comparisons[0].panel.chart().unwrap().values.is_empty());
    }

    #[test]
    fn missing_groups_and_illiteracy_become_notices() {
        let view = dashboard().render(&DashboardState::default()).unwrap();

        // No COR_ and no DOM_ columns in the sample.
        assert!(matches!(view.neighborhood_panels[2].body, PanelBody::Notice(_)));
        assert!(matches!(view.neighborhood_panels[3].body, PanelBody::Notice(_)));
        let coverage = view.neighborhood_panels[4].chart().unwrap();
        assert_eq!(coverage.categories, vec!["PROP_LIXO/DOM"]);
        assert_eq!(coverage.values, vec![87.5]);

        assert!(view.comparisons[2].panel.chart().is_none());
    }

    #[test]
    fn sort_menus_reorder_their_charts() {
        let state = DashboardState {
            density_sort: 3,
            income_sort: 1,
            ..Default::default()
        };
        let view = dashboard().render(&state).unwrap();

        let density = view.comparisons[0].panel.chart().unwrap();
        assert_eq!(density.categories, vec!["Centro", "Benfica", "Aldeota"]);
        assert_eq!(density.values, vec![1500.0, 1200.0, 900.0]);
        assert_eq!(
            categories(&view.comparisons[1]),
            vec!["Centro", "Benfica", "Aldeota"]
        );
    }

    #[test]
    fn sync_state_records_effective_choices() {
        let mut state = DashboardState {
            neighborhood: Some("Nowhere".to_string()),
            income_sort: 99,
            ..Default::default()
        };
        let view = dashboard().render(&state).unwrap();
        view.sync_state(&mut state);

        assert_eq!(state.filter.column.as_deref(), Some("NOME_BAIRRO"));
        assert_eq!(state.neighborhood.as_deref(), Some("Centro"));
        assert_eq!(state.income_sort, 0);
    }

    #[test]
    fn changed_file_is_reloaded_and_failed_reload_keeps_data() {
        let file = Builder::new().suffix(".csv").tempfile().unwrap();
        let path = file.path().to_path_buf();
        write_csv(
            &path,
            "NOME_BAIRRO,PROP_LIXO/DOM,RESP_RENDA_MEDIA\nCentro,0.875,2500.5\n",
        );

        let config = DashboardConfig {
            data_path: path.clone(),
            ..Default::default()
        };
        let mut dashboard = Dashboard::open(config).unwrap();
        assert_eq!(dashboard.row_count(), 1);
        assert!(!dashboard.reload_if_changed().unwrap());

        write_csv(
            &path,
            "NOME_BAIRRO,PROP_LIXO/DOM,RESP_RENDA_MEDIA\nCentro,0.875,2500.5\nAldeota,0.5,4000.0\n",
        );
        bump_mtime(&path, 10);
        assert!(dashboard.reload_if_changed().unwrap());
        assert_eq!(dashboard.row_count(), 2);

        // Formatted once: the fraction becomes a percentage a single time.
        let view = dashboard.render(&DashboardState::default()).unwrap();
        let headers = &view.table.headers;
        let prop = headers.iter().position(|h| h == "PROP_LIXO/DOM").unwrap();
        let income = headers.iter().position(|h| h == "RESP_RENDA_MEDIA").unwrap();
        assert_eq!(view.table.rows[0][prop], "87.50%");
        assert_eq!(view.table.rows[0][income], "R$ 2.500,50");
        assert!(!dashboard.reload_if_changed().unwrap());

        write_csv(&path, "BAIRRO,DENSIDADE\nCentro,1500.0\n");
        bump_mtime(&path, 20);
        assert!(matches!(
            dashboard.reload_if_changed(),
            Err(DashboardError::Loader(LoaderError::MissingColumn(_)))
        ));
        assert_eq!(dashboard.row_count(), 2);
    }

    #[test]
    fn frame_without_columns_is_an_error() {
        let dashboard =
            Dashboard::from_frame(DashboardConfig::default(), DataFrame::empty()).unwrap();
        assert!(matches!(
            dashboard.render(&DashboardState::default()),
            Err(DashboardError::NoColumns)
        ));
    }
}
