//! Painel de Bairros - Neighborhood Indicators Dashboard
//!
//! Loads a spreadsheet of neighborhood indicators and shows a filterable
//! table with demographic and infrastructure charts.

mod charts;
mod config;
mod dashboard;
mod data;
mod gui;

use anyhow::{Context, Result};
use config::{DashboardConfig, CONFIG_FILE};
use dashboard::Dashboard;
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    let data_path = config.data_path.clone();

    // The dashboard has nothing to show without its data: fail at startup.
    let dashboard = Dashboard::open(config)
        .with_context(|| format!("failed to load {}", data_path.display()))?;
    info!(rows = dashboard.row_count(), "dashboard ready");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Painel de Bairros"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Painel de Bairros",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
