//! Data module - spreadsheet loading, formatting and processing

mod formatter;
mod loader;
mod processor;
mod record;

pub use formatter::{DataFormatter, FormatError};
pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError, TableView};
pub use record::{CellValue, NeighborhoodRecord};
