pub mod cards;
pub mod config;
pub mod properties;
pub mod sheets;
pub mod web;

use std::path::Path;

use cards::{CardStore, LocalCardStore};
use config::AppConfig;
use properties::UserProperties;
use sheets::CsvSpreadsheetStore;

/// Error raised while wiring up the local card store
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Sheet(#[from] sheets::SheetError),

    #[error(transparent)]
    Property(#[from] properties::PropertyError),
}

/// Open the CSV spreadsheets and the properties of `user` under the
/// configured data directory.
pub fn open_local_store(config: AppConfig, user: &str) -> Result<LocalCardStore, SetupError> {
    let data_dir = config.data_dir()?;
    open_local_store_at(config, &data_dir, user)
}

pub fn open_local_store_at(
    config: AppConfig,
    data_dir: &Path,
    user: &str,
) -> Result<LocalCardStore, SetupError> {
    config.validate()?;
    let sheets = CsvSpreadsheetStore::new(data_dir, config.public_url())?;
    let properties = UserProperties::open(data_dir, user)?;
    Ok(CardStore::new(config, sheets, properties))
}
