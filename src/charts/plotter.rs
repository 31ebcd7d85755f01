//! Chart Plotter Module
//! Draws chart specifications with egui_plot: bar charts with category
//! labels on the x-axis and pie charts built from polygon wedges.

use crate::charts::{ChartKind, ChartSpec};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};
use std::f64::consts::TAU;

pub const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),  // Blue
    Color32::from_rgb(239, 85, 59),   // Red
    Color32::from_rgb(0, 204, 150),   // Green
    Color32::from_rgb(171, 99, 250),  // Purple
    Color32::from_rgb(255, 161, 90),  // Orange
    Color32::from_rgb(25, 211, 243),  // Cyan
    Color32::from_rgb(255, 102, 146), // Pink
    Color32::from_rgb(182, 232, 128), // Lime
    Color32::from_rgb(255, 151, 255), // Magenta
    Color32::from_rgb(254, 203, 82),  // Yellow
];

/// Segments used for a full circle.
const PIE_RESOLUTION: usize = 120;

/// Wedge geometry of a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Renders chart specs into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Split the circle among positive values, clockwise from twelve o'clock.
    pub fn pie_slices(categories: &[String], values: &[f64]) -> Vec<PieSlice> {
        let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut angle = TAU / 4.0;
        categories
            .iter()
            .zip(values)
            .filter(|(_, v)| **v > 0.0)
            .map(|(label, &value)| {
                let fraction = value / total;
                let start_angle = angle;
                angle -= fraction * TAU;
                PieSlice {
                    label: label.clone(),
                    value,
                    fraction,
                    start_angle,
                    end_angle: angle,
                }
            })
            .collect()
    }

    pub fn draw(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) {
        if let Some(title) = &spec.title {
            ui.label(RichText::new(title).size(14.0).strong());
        }

        if spec.values.is_empty() {
            ui.label(RichText::new("Sem dados para exibir.").color(Color32::GRAY));
            return;
        }

        match spec.kind {
            ChartKind::Bar => Self::draw_bar_chart(ui, spec, height),
            ChartKind::Pie => Self::draw_pie_chart(ui, spec, height),
        }
    }

    /// Bars at x = 0..n with the category names as tick labels.
    fn draw_bar_chart(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) {
        let x_labels = spec.categories.clone();

        let bars: Vec<Bar> = spec
            .categories
            .iter()
            .zip(&spec.values)
            .enumerate()
            .map(|(i, (label, &value))| {
                Bar::new(i as f64, value)
                    .name(label)
                    .width(0.7)
                    .fill(BAR_COLOR)
            })
            .collect();

        Plot::new(format!("bar_{}", spec.id))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .include_y(0.0)
            .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                x_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
            });
    }

    /// Unit-circle wedges with percentage labels and a legend.
    fn draw_pie_chart(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) {
        let slices = Self::pie_slices(&spec.categories, &spec.values);

        Plot::new(format!("pie_{}", spec.id))
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .show_y(false)
            .include_x(-1.2)
            .include_x(1.2)
            .include_y(-1.2)
            .include_y(1.2)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, slice) in slices.iter().enumerate() {
                    let color = Self::color(i);
                    let steps =
                        ((PIE_RESOLUTION as f64 * slice.fraction).ceil() as usize).max(2);
                    let sweep = slice.end_angle - slice.start_angle;

                    let mut points = Vec::with_capacity(steps + 2);
                    points.push([0.0, 0.0]);
                    for s in 0..=steps {
                        let a = slice.start_angle + sweep * s as f64 / steps as f64;
                        points.push([a.cos(), a.sin()]);
                    }

                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(points))
                            .fill_color(color)
                            .stroke(egui::Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.label),
                    );

                    let mid = (slice.start_angle + slice.end_angle) / 2.0;
                    plot_ui.text(Text::new(
                        PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                        RichText::new(format!("{:.1}%", slice.fraction * 100.0))
                            .color(Color32::WHITE)
                            .strong(),
                    ));
                }
            });
    }
}
