use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use flashcards_lib::cards::LocalCardStore;
use flashcards_lib::config::AppConfig;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub user: String,
}

impl App {
    /// Load configuration, letting command-line values win over the file
    pub fn new(
        config_path: Option<&Path>,
        data_dir: Option<PathBuf>,
        user: Option<String>,
    ) -> Result<Self> {
        let mut config = AppConfig::load_or_default(config_path, data_dir.as_deref())
            .context("Failed to load configuration")?;

        if data_dir.is_some() {
            config.data_dir = data_dir;
        }
        let user = user.unwrap_or_else(|| config.user.clone());

        Ok(Self { config, user })
    }

    /// Open the card store for the current user
    pub fn open_store(&self) -> Result<LocalCardStore> {
        flashcards_lib::open_local_store(self.config.clone(), &self.user)
            .with_context(|| format!("Failed to open card store for user '{}'", self.user))
    }
}
