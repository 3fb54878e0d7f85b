use serde::{Deserialize, Serialize};

use super::storage::{PropertyStore, Result};

/// Where a user's card spreadsheet lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreLocation {
    pub id: String,
    pub url: String,
}

impl StoreLocation {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Read the location stored under the given keys. `None` when no id is set.
    pub fn load<P: PropertyStore + ?Sized>(
        properties: &P,
        id_key: &str,
        url_key: &str,
    ) -> Result<Option<Self>> {
        let id = match properties.get_property(id_key)? {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };
        let url = properties.get_property(url_key)?.unwrap_or_default();
        Ok(Some(Self { id, url }))
    }

    /// Persist both keys in one write
    pub fn save<P: PropertyStore + ?Sized>(
        &self,
        properties: &P,
        id_key: &str,
        url_key: &str,
    ) -> Result<()> {
        properties.set_properties(&[(id_key, self.id.as_str()), (url_key, self.url.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::UserProperties;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let props = UserProperties::open(temp.path(), "default").unwrap();

        assert_eq!(StoreLocation::load(&props, "sheetId", "sheetUrl").unwrap(), None);

        let location = StoreLocation::new("abc", "http://127.0.0.1:8080/spreadsheets/abc");
        location.save(&props, "sheetId", "sheetUrl").unwrap();

        assert_eq!(
            StoreLocation::load(&props, "sheetId", "sheetUrl").unwrap(),
            Some(location)
        );
        assert_eq!(props.get_property("sheetId").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_save_replaces_both_keys() {
        let temp = TempDir::new().unwrap();
        let props = UserProperties::open(temp.path(), "default").unwrap();

        StoreLocation::new("old", "http://old").save(&props, "id", "url").unwrap();
        StoreLocation::new("new", "http://new").save(&props, "id", "url").unwrap();

        let loaded = StoreLocation::load(&props, "id", "url").unwrap().unwrap();
        assert_eq!(loaded.id, "new");
        assert_eq!(loaded.url, "http://new");
    }
}
