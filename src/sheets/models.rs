use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for a spreadsheet. Only the primary sheet is modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub id: Uuid,
    pub name: String,
    /// Shareable link to the primary sheet
    pub url: String,
    /// Rows pinned at the top of the sheet (the header)
    #[serde(default)]
    pub frozen_rows: usize,
    /// Column layout version the sheet was created with
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    1
}

impl Spreadsheet {
    pub fn new(name: String, base_url: &str, schema_version: u32) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            url: Self::link(base_url, id),
            name,
            frozen_rows: 0,
            schema_version,
            created_at: Utc::now(),
        }
    }

    /// Link to the sheet with the given id under `base_url`
    pub fn link(base_url: &str, id: Uuid) -> String {
        format!("{}/spreadsheets/{}", base_url.trim_end_matches('/'), id)
    }
}
