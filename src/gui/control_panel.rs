//! Control Panel Widget
//! Left side panel with the data source summary and the column/value filter.

use crate::dashboard::{FilterState, FilterView};
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Left side panel with file information, filters and status line.
pub struct ControlPanel {
    pub file_name: String,
    pub row_count: usize,
    pub status: String,
}

impl ControlPanel {
    pub fn new(file_name: String, row_count: usize) -> Self {
        Self {
            file_name,
            row_count,
            status: "Pronto".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        view: Option<&FilterView>,
        filter: &mut FilterState,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏘 Painel de Bairros")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Indicadores por bairro")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Planilha").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.file_name).size(12.0));
                ui.label(
                    RichText::new(format!("{} bairros carregados", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        if let Some(view) = view {
            egui::CollapsingHeader::new(
                RichText::new("🔽 Configurações de Filtros").size(14.0).strong(),
            )
            .default_open(true)
            .show(ui, |ui| {
                if Self::show_filters(ui, view, filter) {
                    action = ControlPanelAction::FilterChanged;
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.starts_with("Erro") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Column dropdown plus one checkbox per distinct value. Returns true
    /// when the filter changed.
    fn show_filters(ui: &mut egui::Ui, view: &FilterView, filter: &mut FilterState) -> bool {
        let mut changed = false;

        ui.label("Selecione a Coluna para Filtrar");
        ComboBox::from_id_salt("filter_column")
            .width(220.0)
            .selected_text(&view.column)
            .show_ui(ui, |ui| {
                for col in &view.columns {
                    if ui.selectable_label(view.column == *col, col).clicked() {
                        filter.set_column(col.clone());
                        changed = true;
                    }
                }
            });

        ui.add_space(8.0);
        ui.label("Escolha os Valores");
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    for value in &view.options {
                        let mut checked = view.selected.contains(value);
                        let label = if value.is_empty() { "(vazio)" } else { value.as_str() };
                        if ui.checkbox(&mut checked, label).changed() {
                            filter.toggle(value, &view.options);
                            changed = true;
                        }
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Selecionar Todos").clicked() {
                filter.select_all();
                changed = true;
            }
            if ui.small_button("Limpar").clicked() {
                filter.clear_all();
                changed = true;
            }
        });

        if view.selected.is_empty() {
            ui.label(
                RichText::new("Nenhum valor selecionado: mostrando a tabela completa.")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        changed
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FilterChanged,
}
