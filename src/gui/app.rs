//! Dashboard Main Application
//! Main window with control panel and the dashboard page.

use crate::dashboard::{Dashboard, DashboardState, DashboardView};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    state: DashboardState,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Last render and the state it was produced for
    view: Option<DashboardView>,
    rendered_for: Option<DashboardState>,

    reload_interval: Duration,
    last_reload_check: Instant,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard) -> Self {
        let file_name = dashboard
            .config()
            .data_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let control_panel = ControlPanel::new(file_name, dashboard.row_count());
        let reload_interval = Duration::from_secs(dashboard.config().reload_interval_secs.max(1));

        Self {
            dashboard,
            state: DashboardState::default(),
            control_panel,
            chart_viewer: ChartViewer::new(),
            view: None,
            rendered_for: None,
            reload_interval,
            last_reload_check: Instant::now(),
        }
    }

    /// Reload the dataset when the file changed since the last check.
    fn check_reload(&mut self) {
        if self.last_reload_check.elapsed() < self.reload_interval {
            return;
        }
        self.last_reload_check = Instant::now();

        match self.dashboard.reload_if_changed() {
            Ok(true) => {
                let rows = self.dashboard.row_count();
                self.control_panel.row_count = rows;
                self.control_panel
                    .set_status(&format!("Planilha recarregada: {} bairros", rows));
                self.rendered_for = None;
            }
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, "reload failed, keeping previous data");
                self.control_panel
                    .set_status(&format!("Erro ao recarregar: {}", e));
            }
        }
    }

    /// Re-run the dashboard when the state changed since the last render.
    fn refresh_view(&mut self) {
        if self.rendered_for.as_ref() == Some(&self.state) {
            return;
        }

        match self.dashboard.render(&self.state) {
            Ok(view) => {
                view.sync_state(&mut self.state);
                self.rendered_for = Some(self.state.clone());
                self.view = Some(view);
            }
            Err(e) => {
                error!(error = %e, "render failed");
                self.control_panel.set_status(&format!("Erro: {}", e));
                self.rendered_for = Some(self.state.clone());
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_reload();
        self.refresh_view();

        // Keep polling the file while idle
        ctx.request_repaint_after(self.reload_interval);

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let filter_view = self.view.as_ref().map(|v| &v.filter);
                    let action = self
                        .control_panel
                        .show(ui, filter_view, &mut self.state.filter);

                    match action {
                        ControlPanelAction::FilterChanged => {
                            info!(column = ?self.state.filter.column, "filter changed");
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard page
        egui::CentralPanel::default().show(ctx, |ui| match &self.view {
            Some(view) => {
                if self.chart_viewer.show(ui, view, &mut self.state) {
                    ctx.request_repaint();
                }
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Sem dados").size(20.0));
                });
            }
        });
    }
}
