//! Spreadsheet I/O
//!
//! - Read: MRF workbooks (.xls, .xlsx, .xlsm) → in-memory sheets
//! - Write: summary table → .xlsx with formulas and number formats

mod address;
mod exporter;
mod workbook;

pub use address::{column_index_to_letter, column_letter_to_index, CellRange, CellRef};
pub use exporter::{ExportMetadata, SummaryExporter};
pub use workbook::{Cell, CellValue, Sheet, TableRegion, Workbook};
