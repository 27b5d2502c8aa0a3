//! File processors: spreadsheet ingestion and export

pub mod export;
pub mod workbook;

pub use export::{clipboard_text, export_results, ExportFormat};
pub use workbook::read_workbook;
