/// Application constants used throughout the application

/// The display name of the application
pub const APP_NAME: &str = "madin";

/// The lowercase version for file and directory names
pub const APP_NAME_LOWERCASE: &str = "madin";

/// Short description of the application
pub const APP_DESCRIPTION_SHORT: &str = "Presentation helpers for the madin blog theme";

/// Version of the application (should match Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the JSON file backing client storage
pub const STORE_FILE_NAME: &str = "storage.json";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.json";
