//! Persistent client storage: the origin-scoped key/value store the theme and
//! font-size preferences live in.

use crate::utils::data;
use log::debug;
use std::cell::{ Cell, RefCell };
use std::collections::{ BTreeMap, HashMap };
use std::path::{ Path, PathBuf };
use thiserror::Error;

pub const THEME_KEY: &str = "color-theme";
pub const FONT_SIZE_KEY: &str = "font-size";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every call may fail; callers decide whether a failure matters.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    available: Cell<bool>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            available: Cell::new(true),
        }
    }

    /// Storage that refuses every access, like a browser with storage disabled
    pub fn unavailable() -> Self {
        let storage = Self::new();
        storage.available.set(false);
        storage
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Reads regardless of availability, for assertions
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.get() { Ok(()) } else { Err(StorageError::Unavailable) }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key/value pairs kept as one pretty-printed JSON object on disk.
///
/// Every access re-reads the file and `set` rewrites it whole. The
/// read-modify-write is not atomic; a single writer is assumed.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        data::load_json_or_default(&self.path)
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        data::save_json_to_file(&entries, &self.path)?;
        debug!("💾 Stored {} = {} in {}", key, value, self.path.display());
        Ok(())
    }
}
