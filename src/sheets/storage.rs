//! Storage operations for spreadsheets
//!
//! Directory structure:
//! ```text
//! spreadsheets/{spreadsheet-id}/
//! ├── spreadsheet.json   # Spreadsheet metadata
//! └── sheet1.csv         # Primary sheet, header row first
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use super::models::Spreadsheet;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet not found: {0}")]
    NotFound(String),

    #[error("Invalid spreadsheet id: {0}")]
    InvalidId(String),
}

impl SheetError {
    /// True when the spreadsheet does not exist or the id cannot name one
    pub fn is_missing(&self) -> bool {
        matches!(self, SheetError::NotFound(_) | SheetError::InvalidId(_))
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Tabular store holding card spreadsheets
pub trait SpreadsheetStore: Send {
    /// Create an empty spreadsheet
    fn create(&self, name: &str, schema_version: u32) -> Result<Spreadsheet>;

    fn open_by_id(&self, id: &str) -> Result<Spreadsheet>;

    /// All rows of the primary sheet, header included
    fn read_rows(&self, spreadsheet: &Spreadsheet) -> Result<Vec<Vec<String>>>;

    fn append_row(&self, spreadsheet: &Spreadsheet, row: &[String]) -> Result<()>;

    fn set_frozen_rows(&self, spreadsheet: &mut Spreadsheet, rows: usize) -> Result<()>;
}

/// Spreadsheets stored as CSV files on the local filesystem
pub struct CsvSpreadsheetStore {
    /// Base path for spreadsheets (e.g., ~/.local/share/flashcards/spreadsheets)
    base_path: PathBuf,
    /// Prefix for the links handed out with each spreadsheet
    public_url: String,
}

impl CsvSpreadsheetStore {
    pub fn new(data_dir: &Path, public_url: impl Into<String>) -> Result<Self> {
        let base_path = data_dir.join("spreadsheets");
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            public_url: public_url.into(),
        })
    }

    fn spreadsheet_dir(&self, id: Uuid) -> PathBuf {
        self.base_path.join(id.to_string())
    }

    fn metadata_path(&self, id: Uuid) -> PathBuf {
        self.spreadsheet_dir(id).join("spreadsheet.json")
    }

    /// Path of the CSV file backing the primary sheet
    pub fn sheet_path(&self, id: Uuid) -> PathBuf {
        self.spreadsheet_dir(id).join("sheet1.csv")
    }

    fn save_metadata(&self, spreadsheet: &Spreadsheet) -> Result<()> {
        let path = self.metadata_path(spreadsheet.id);
        fs::write(&path, serde_json::to_string_pretty(spreadsheet)?)?;
        Ok(())
    }
}

impl SpreadsheetStore for CsvSpreadsheetStore {
    fn create(&self, name: &str, schema_version: u32) -> Result<Spreadsheet> {
        let spreadsheet = Spreadsheet::new(name.to_string(), &self.public_url, schema_version);

        fs::create_dir_all(self.spreadsheet_dir(spreadsheet.id))?;
        fs::write(self.sheet_path(spreadsheet.id), "")?;
        self.save_metadata(&spreadsheet)?;

        log::info!("Created spreadsheet '{}' ({})", spreadsheet.name, spreadsheet.id);
        Ok(spreadsheet)
    }

    fn open_by_id(&self, id: &str) -> Result<Spreadsheet> {
        let uuid = Uuid::parse_str(id.trim()).map_err(|_| SheetError::InvalidId(id.to_string()))?;

        let path = self.metadata_path(uuid);
        if !path.exists() || !self.sheet_path(uuid).exists() {
            return Err(SheetError::NotFound(id.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        let mut spreadsheet: Spreadsheet = serde_json::from_str(&content)?;
        // Links follow the current public URL, not the one at creation time
        spreadsheet.url = Spreadsheet::link(&self.public_url, uuid);
        Ok(spreadsheet)
    }

    fn read_rows(&self, spreadsheet: &Spreadsheet) -> Result<Vec<Vec<String>>> {
        let path = self.sheet_path(spreadsheet.id);
        if !path.exists() {
            return Err(SheetError::NotFound(spreadsheet.id.to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        // Cells are not validated; bytes that are not UTF-8 become U+FFFD
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect(),
            );
        }

        log::debug!("Read {} rows from spreadsheet {}", rows.len(), spreadsheet.id);
        Ok(rows)
    }

    fn append_row(&self, spreadsheet: &Spreadsheet, row: &[String]) -> Result<()> {
        let path = self.sheet_path(spreadsheet.id);
        if !path.exists() {
            return Err(SheetError::NotFound(spreadsheet.id.to_string()));
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }

    fn set_frozen_rows(&self, spreadsheet: &mut Spreadsheet, rows: usize) -> Result<()> {
        spreadsheet.frozen_rows = rows;
        self.save_metadata(spreadsheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (CsvSpreadsheetStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvSpreadsheetStore::new(temp_dir.path(), "http://localhost:8080").unwrap();
        (store, temp_dir)
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_create_and_open() {
        let (store, _temp) = create_test_store();

        let created = store.create("Flash Cards", 1).unwrap();
        assert_eq!(
            created.url,
            format!("http://localhost:8080/spreadsheets/{}", created.id)
        );

        let opened = store.open_by_id(&created.id.to_string()).unwrap();
        assert_eq!(opened, created);
        assert!(store.read_rows(&opened).unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_and_malformed() {
        let (store, _temp) = create_test_store();

        let missing = store.open_by_id(&Uuid::new_v4().to_string()).unwrap_err();
        assert!(matches!(missing, SheetError::NotFound(_)));
        assert!(missing.is_missing());

        let malformed = store.open_by_id("not-a-sheet").unwrap_err();
        assert!(matches!(malformed, SheetError::InvalidId(_)));
    }

    #[test]
    fn test_append_preserves_order_and_quoting() {
        let (store, _temp) = create_test_store();
        let sheet = store.create("Flash Cards", 1).unwrap();

        store.append_row(&sheet, &row(&["Chapter", "Section", "Front", "Back"])).unwrap();
        store.append_row(&sheet, &row(&["1", "1", "Comma, inside", "Line\nbreak"])).unwrap();
        store.append_row(&sheet, &row(&["1", "2", "\"Quoted\"", ""])).unwrap();

        let rows = store.read_rows(&sheet).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&["1", "1", "Comma, inside", "Line\nbreak"]));
        assert_eq!(rows[2], row(&["1", "2", "\"Quoted\"", ""]));
    }

    #[test]
    fn test_ragged_rows_are_read() {
        let (store, _temp) = create_test_store();
        let sheet = store.create("Flash Cards", 1).unwrap();
        fs::write(store.sheet_path(sheet.id), "a,b,c,d\n1,2\n").unwrap();

        let rows = store.read_rows(&sheet).unwrap();
        assert_eq!(rows[1], row(&["1", "2"]));
    }

    #[test]
    fn test_open_without_sheet_file() {
        let (store, _temp) = create_test_store();
        let sheet = store.create("Flash Cards", 1).unwrap();
        fs::remove_file(store.sheet_path(sheet.id)).unwrap();

        let err = store.open_by_id(&sheet.id.to_string()).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_open_uses_current_public_url() {
        let temp = TempDir::new().unwrap();
        let old = CsvSpreadsheetStore::new(temp.path(), "http://localhost:8080").unwrap();
        let sheet = old.create("Flash Cards", 1).unwrap();

        let moved = CsvSpreadsheetStore::new(temp.path(), "https://cards.example.com/").unwrap();
        let opened = moved.open_by_id(&sheet.id.to_string()).unwrap();
        assert_eq!(
            opened.url,
            format!("https://cards.example.com/spreadsheets/{}", sheet.id)
        );
    }

    #[test]
    fn test_invalid_utf8_cells_are_read_lossily() {
        let (store, _temp) = create_test_store();
        let sheet = store.create("Flash Cards", 1).unwrap();
        fs::write(store.sheet_path(sheet.id), b"a,b,c,d\n1,1,caf\xe9,x\n").unwrap();

        let rows = store.read_rows(&sheet).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "caf\u{FFFD}");
        assert_eq!(rows[1][3], "x");
    }

    #[test]
    fn test_frozen_rows_persist() {
        let (store, _temp) = create_test_store();
        let mut sheet = store.create("Flash Cards", 1).unwrap();

        store.set_frozen_rows(&mut sheet, 1).unwrap();

        let reopened = store.open_by_id(&sheet.id.to_string()).unwrap();
        assert_eq!(reopened.frozen_rows, 1);
    }
}
