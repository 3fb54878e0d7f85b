use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropertyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid user name")]
    InvalidUser,
}

pub type Result<T> = std::result::Result<T, PropertyError>;

/// Key-value properties scoped to one user
pub trait PropertyStore: Send {
    fn get_property(&self, key: &str) -> Result<Option<String>>;

    /// Set several keys in one write
    fn set_properties(&self, values: &[(&str, &str)]) -> Result<()>;

    fn set_property(&self, key: &str, value: &str) -> Result<()> {
        self.set_properties(&[(key, value)])
    }
}

/// File-backed properties for a single user.
///
/// Stored at `{base}/properties/{user}.json`, with the user name
/// percent-encoded so any name maps to a single file.
pub struct UserProperties {
    path: PathBuf,
}

impl UserProperties {
    pub fn open(base_path: &Path, user: &str) -> Result<Self> {
        if user.trim().is_empty() {
            return Err(PropertyError::InvalidUser);
        }

        let dir = base_path.join("properties");
        fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join(format!("{}.json", urlencoding::encode(user))),
        })
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let properties: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(properties)
    }

    fn write_all(&self, properties: &BTreeMap<String, String>) -> Result<()> {
        // Replace via rename so the whole map changes at once
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(properties)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl PropertyStore for UserProperties {
    fn get_property(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_properties(&self, values: &[(&str, &str)]) -> Result<()> {
        let mut properties = self.read_all()?;
        for (key, value) in values {
            properties.insert(key.to_string(), value.to_string());
        }
        self.write_all(&properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_property() {
        let temp = TempDir::new().unwrap();
        let props = UserProperties::open(temp.path(), "ada").unwrap();
        assert_eq!(props.get_property("sheetId").unwrap(), None);
    }

    #[test]
    fn test_set_and_overwrite() {
        let temp = TempDir::new().unwrap();
        let props = UserProperties::open(temp.path(), "ada").unwrap();

        props.set_property("sheetId", "one").unwrap();
        props.set_property("other", "kept").unwrap();
        props.set_property("sheetId", "two").unwrap();

        assert_eq!(props.get_property("sheetId").unwrap().as_deref(), Some("two"));
        assert_eq!(props.get_property("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_users_are_isolated() {
        let temp = TempDir::new().unwrap();
        let ada = UserProperties::open(temp.path(), "ada").unwrap();
        let grace = UserProperties::open(temp.path(), "grace/../ada").unwrap();

        ada.set_property("sheetId", "ada-sheet").unwrap();
        assert_eq!(grace.get_property("sheetId").unwrap(), None);
    }

    #[test]
    fn test_empty_user_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            UserProperties::open(temp.path(), "  "),
            Err(PropertyError::InvalidUser)
        ));
    }
}
