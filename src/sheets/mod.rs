//! Spreadsheet-backed tabular storage

mod models;
mod storage;

pub use models::Spreadsheet;
pub use storage::{CsvSpreadsheetStore, Result, SheetError, SpreadsheetStore};
