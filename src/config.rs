//! Application configuration
//!
//! Loaded from a TOML file (every field optional) and passed explicitly to the
//! card store and the web layer.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::CardField;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid column mapping: {0}")]
    InvalidHeadings(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Column layout of a card sheet.
///
/// Every field owns one position and the positions cover `0..4`. Changing the
/// order changes how existing sheets are read, so any reordering must come
/// with a bump of `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headings {
    pub version: u32,
    pub chapter: usize,
    pub section: usize,
    pub front: usize,
    pub back: usize,
}

impl Default for Headings {
    fn default() -> Self {
        Self {
            version: 1,
            chapter: 0,
            section: 1,
            front: 2,
            back: 3,
        }
    }
}

impl Headings {
    /// Column index of a field
    pub fn position(&self, field: CardField) -> usize {
        match field {
            CardField::Chapter => self.chapter,
            CardField::Section => self.section,
            CardField::Front => self.front,
            CardField::Back => self.back,
        }
    }

    /// Number of columns a row written with this layout occupies
    pub fn width(&self) -> usize {
        CardField::ALL
            .iter()
            .map(|f| self.position(*f) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check that the positions are a permutation of `0..4`
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; 4];
        for field in CardField::ALL {
            let pos = self.position(field);
            if pos >= seen.len() {
                return Err(ConfigError::InvalidHeadings(format!(
                    "{} is at column {}, expected a column below {}",
                    field.heading(),
                    pos,
                    seen.len()
                )));
            }
            if seen[pos] {
                return Err(ConfigError::InvalidHeadings(format!(
                    "column {} is assigned twice",
                    pos
                )));
            }
            seen[pos] = true;
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name given to newly created spreadsheets
    pub spreadsheet_name: String,
    /// Property key holding the spreadsheet id
    pub spreadsheet_id_key: String,
    /// Property key holding the spreadsheet URL
    pub sheet_url_key: String,
    pub headings: Headings,
    /// Title of the rendered page
    pub page_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub listen: SocketAddr,
    /// Base URL used when building spreadsheet links. Derived from `listen` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// User whose properties the server reads
    pub user: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spreadsheet_name: "Flash Cards".to_string(),
            spreadsheet_id_key: "sheetId".to_string(),
            sheet_url_key: "sheetUrl".to_string(),
            headings: Headings::default(),
            page_title: "flash cards".to_string(),
            data_dir: None,
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_url: None,
            user: "default".to_string(),
        }
    }
}

impl AppConfig {
    /// Platform data directory used when none is configured
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("flashcards"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `path` if given, otherwise `<data_dir>/config.toml` when it exists,
    /// otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::default_data_dir()?,
        };
        let candidate = data_dir.join("config.toml");
        if candidate.exists() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.headings.validate()
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_dir(),
        }
    }

    /// Base URL for links handed to the client, without a trailing slash
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.listen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_headings_are_valid() {
        let headings = Headings::default();
        assert!(headings.validate().is_ok());
        assert_eq!(headings.width(), 4);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let headings = Headings {
            back: 0,
            ..Default::default()
        };
        assert!(matches!(
            headings.validate(),
            Err(ConfigError::InvalidHeadings(_))
        ));
    }

    #[test]
    fn test_out_of_range_column_rejected() {
        let headings = Headings {
            front: 7,
            ..Default::default()
        };
        assert!(headings.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
spreadsheet_name = "Biology"
listen = "0.0.0.0:9000"

[headings]
front = 0
back = 1
chapter = 2
section = 3
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.spreadsheet_name, "Biology");
        assert_eq!(config.page_title, "flash cards");
        assert_eq!(config.headings.front, 0);
        assert_eq!(config.headings.version, 1);
        assert_eq!(config.public_url(), "http://0.0.0.0:9000");
    }

    #[test]
    fn test_load_rejects_bad_mapping() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[headings]\nchapter = 1\n").unwrap();

        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(None, Some(temp.path())).unwrap();
        assert_eq!(config.spreadsheet_id_key, "sheetId");
        assert_eq!(config.sheet_url_key, "sheetUrl");
    }

    #[test]
    fn test_public_url_trims_slash() {
        let config = AppConfig {
            public_url: Some("https://cards.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.public_url(), "https://cards.example.com");
    }
}
