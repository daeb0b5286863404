/// Centralized path definitions
///
/// ## Path Structure
/// - `<data dir>/config.json` - Preview configuration
/// - `<data dir>/storage.json` - Default file behind client storage
///
/// The data directory is the platform one for madin:
/// - Windows: %APPDATA%/madin
/// - macOS: ~/Library/Application Support/madin
/// - Linux: ~/.local/share/madin
///
/// `MADIN_DATA_DIR` overrides it.
use crate::utils::constants::APP_NAME_LOWERCASE;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DATA_DIR_ENV: &str = "MADIN_DATA_DIR";

/// Get the data directory, resolved once per process
fn get_app_data_dir() -> &'static PathBuf {
    static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
    DATA_DIR.get_or_init(|| {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            log::debug!("📂 Data dir (from {}): {}", DATA_DIR_ENV, PathBuf::from(&dir).display());
            return PathBuf::from(dir);
        }

        if let Some(base_dirs) = directories::BaseDirs::new() {
            let dir = base_dirs.data_dir().join(APP_NAME_LOWERCASE);
            log::debug!("📂 Data dir: {}", dir.display());
            return dir;
        }

        // Fallback to current working directory
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        log::debug!("📂 Data dir (fallback - from cwd): {}", cwd.display());
        cwd.join("data")
    })
}

/// Application data directory paths
pub mod data {
    use super::get_app_data_dir;
    use crate::utils::constants::{ CONFIG_FILE_NAME, STORE_FILE_NAME };
    use std::path::PathBuf;

    /// Application configuration file
    pub fn config_json() -> PathBuf {
        get_app_data_dir().join(CONFIG_FILE_NAME)
    }

    /// Default client storage file
    pub fn store_json() -> PathBuf {
        get_app_data_dir().join(STORE_FILE_NAME)
    }
}
