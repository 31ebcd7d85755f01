//! Charts module - chart specs and rendering

mod builder;
mod plotter;

pub use builder::{ChartBuilder, ChartKind, ChartPanel, ChartSpec, ComparisonColumns, PanelBody};
pub use plotter::ChartPlotter;
