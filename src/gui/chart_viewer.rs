//! Chart Viewer Widget
//! Central scrollable page: filtered table, neighborhood picker, the five
//! single-neighborhood panels and the three sortable comparison charts.

use crate::charts::{ChartPanel, ChartPlotter, PanelBody};
use crate::dashboard::{
    ComparisonSection, DashboardState, DashboardView, EMPTY_VIEW_NOTICE, PAGE_TITLE,
};
use crate::data::TableView;
use egui::{Color32, ComboBox, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 320.0;
const TABLE_HEIGHT: f32 = 280.0;
const SECTION_SPACING: f32 = 18.0;

/// Scrollable dashboard page.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the page. Returns true when a widget changed the state.
    pub fn show(&mut self, ui: &mut egui::Ui, view: &DashboardView, state: &mut DashboardState) -> bool {
        let mut changed = false;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new(PAGE_TITLE).size(26.0).strong());
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("🔎 Dados Filtrados").size(18.0).strong());
                Self::draw_table(ui, &view.table);
                ui.add_space(SECTION_SPACING);

                changed |= Self::draw_neighborhood_section(ui, view, state);

                for (i, section) in view.comparisons.iter().enumerate() {
                    let choice = match i {
                        0 => &mut state.density_sort,
                        1 => &mut state.income_sort,
                        _ => &mut state.illiteracy_sort,
                    };
                    changed |= Self::draw_comparison(ui, section, choice);
                }
            });

        changed
    }

    fn draw_table(ui: &mut egui::Ui, table: &TableView) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::both()
                    .id_salt("filtered_table")
                    .max_height(TABLE_HEIGHT)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        egui::Grid::new("filtered_table_grid")
                            .striped(true)
                            .min_col_width(60.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                for header in &table.headers {
                                    ui.label(RichText::new(header).strong().size(11.0));
                                }
                                ui.end_row();

                                for row in &table.rows {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(11.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    fn draw_neighborhood_section(
        ui: &mut egui::Ui,
        view: &DashboardView,
        state: &mut DashboardState,
    ) -> bool {
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Selecione o Bairro");
            let selected_text = view.neighborhood.clone().unwrap_or_default();
            ComboBox::from_id_salt("neighborhood")
                .width(240.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for name in &view.neighborhoods {
                        let is_selected = view.neighborhood.as_deref() == Some(name.as_str());
                        if ui.selectable_label(is_selected, name).clicked() && !is_selected {
                            state.neighborhood = Some(name.clone());
                            changed = true;
                        }
                    }
                });
        });
        ui.add_space(SECTION_SPACING);

        if view.neighborhood_panels.is_empty() {
            Self::draw_notice(ui, EMPTY_VIEW_NOTICE);
            ui.add_space(SECTION_SPACING);
        }

        for panel in &view.neighborhood_panels {
            Self::draw_panel(ui, panel);
        }

        changed
    }

    fn draw_comparison(ui: &mut egui::Ui, section: &ComparisonSection, choice: &mut usize) -> bool {
        let mut changed = false;

        ui.label(RichText::new(&section.panel.heading).size(18.0).strong());
        ui.label(RichText::new("🔽 Ordenação dos Dados").size(14.0));
        ui.horizontal(|ui| {
            ui.label("Escolha o critério de ordenação");
            let current = section
                .labels
                .get(section.selected)
                .cloned()
                .unwrap_or_default();
            ComboBox::from_id_salt(section.menu_id)
                .width(240.0)
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (i, label) in section.labels.iter().enumerate() {
                        if ui.selectable_label(section.selected == i, label).clicked()
                            && section.selected != i
                        {
                            *choice = i;
                            changed = true;
                        }
                    }
                });
        });
        ui.add_space(8.0);

        Self::draw_body(ui, &section.panel.body);
        ui.add_space(SECTION_SPACING);

        changed
    }

    fn draw_panel(ui: &mut egui::Ui, panel: &ChartPanel) {
        ui.label(RichText::new(&panel.heading).size(18.0).strong());
        ui.add_space(6.0);
        Self::draw_body(ui, &panel.body);
        if let Some(caption) = &panel.caption {
            ui.add_space(6.0);
            ui.label(RichText::new(caption).size(15.0).strong());
        }
        ui.add_space(SECTION_SPACING);
    }

    fn draw_body(ui: &mut egui::Ui, body: &PanelBody) {
        match body {
            PanelBody::Chart(spec) => ChartPlotter::draw(ui, spec, CHART_HEIGHT),
            PanelBody::Notice(text) => Self::draw_notice(ui, text),
        }
    }

    fn draw_notice(ui: &mut egui::Ui, text: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(text)
                        .size(14.0)
                        .color(Color32::from_rgb(243, 156, 18)),
                );
            });
    }
}
