use crate::state::paths;
use crate::utils::data;
use crate::libs::storage::StorageError;
use chrono::{ DateTime, Utc };
use log::warn;
use serde::{ Deserialize, Serialize };
use std::path::{ Path, PathBuf };

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    // Metadata
    pub version: String,
    pub last_updated: DateTime<Utc>,
    // Storage settings
    pub store_path: Option<PathBuf>, // File behind client storage; data dir default when unset
    // Page settings
    pub prefers_dark: bool, // Stands in for the OS `prefers-color-scheme` signal
}

impl AppConfig {
    pub fn load() -> Self {
        Self::load_from(&paths::data::config_json())
    }

    /// Load config from file, falling back to defaults if it doesn't exist or is invalid.
    /// A missing file is created with the defaults; an invalid one is left untouched.
    pub fn load_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            let default_config = Self::default();
            if let Err(e) = default_config.save_to(config_path) {
                warn!("⚠️ Could not write default config: {}", e);
            }
            return default_config;
        }

        match data::load_json_from_file::<AppConfig>(config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️ Failed to load config file: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        self.save_to(&paths::data::config_json())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), StorageError> {
        data::save_json_to_file(self, config_path)
    }

    /// Applies changes and stamps `last_updated`
    pub fn update(&mut self, updater: impl FnOnce(&mut AppConfig)) {
        updater(self);
        self.last_updated = Utc::now();
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(paths::data::store_json)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: crate::utils::constants::APP_VERSION.to_string(),
            last_updated: Utc::now(),
            store_path: None,
            prefers_dark: false,
        }
    }
}
