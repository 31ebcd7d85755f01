//! Dashboard Configuration
//! Column names, group markers and the data file path used by the pipeline.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// All constants the loading/formatting/charting pipeline refers to by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub name_column: String,
    /// Fraction columns rewritten as percentage strings.
    pub percent_columns: Vec<String>,
    pub income_column: String,
    pub income_display_column: String,
    pub race_marker: String,
    pub household_marker: String,
    pub coverage_marker: String,
    pub density_column: String,
    pub illiteracy_column: String,
    pub reload_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dados_filtrados_agrupados_bairrosfinal.xlsx"),
            name_column: "NOME_BAIRRO".to_string(),
            percent_columns: vec![
                "PROP_LIXO/DOM".to_string(),
                "PROP_SANEAMENTO/DOM".to_string(),
                "PROP_AGUA/DOM".to_string(),
            ],
            income_column: "RESP_RENDA_MEDIA".to_string(),
            income_display_column: "RESP_RENDA_FORMATADA".to_string(),
            race_marker: "COR_".to_string(),
            household_marker: "DOM_".to_string(),
            coverage_marker: "PROP_".to_string(),
            density_column: "DENSIDADE".to_string(),
            illiteracy_column: "EDUC_ANALFABETISMO".to_string(),
            reload_interval_secs: 2,
        }
    }
}

impl DashboardConfig {
    /// Load overrides from `path`, falling back to defaults when the file is
    /// absent or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded dashboard config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid dashboard config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable dashboard config, using defaults");
                Self::default()
            }
        }
    }
}
