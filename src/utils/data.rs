use crate::libs::storage::StorageError;
use serde::{ Deserialize, Serialize };
/// Data serialization and file management utilities
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Generic function to load JSON data from file
pub fn load_json_from_file<T>(file_path: &Path) -> Result<T, StorageError>
    where T: for<'de> Deserialize<'de>
{
    let contents = fs::read_to_string(file_path).map_err(|source| StorageError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;

    serde_json::from_str::<T>(&contents).map_err(|source| StorageError::Serialization {
        path: file_path.to_path_buf(),
        source,
    })
}

/// Like [`load_json_from_file`], but a file that does not exist yet reads as the default
pub fn load_json_or_default<T>(file_path: &Path) -> Result<T, StorageError>
    where T: for<'de> Deserialize<'de> + Default
{
    match load_json_from_file(file_path) {
        Err(StorageError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Ok(T::default())
        }
        other => other,
    }
}

/// Generic function to save data as JSON to file
pub fn save_json_to_file<T>(data: &T, file_path: &Path) -> Result<(), StorageError>
    where T: Serialize
{
    // Ensure parent directory exists
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let contents = serde_json::to_string_pretty(data).map_err(|source| {
        StorageError::Serialization {
            path: file_path.to_path_buf(),
            source,
        }
    })?;

    fs::write(file_path, contents).map_err(|source| StorageError::Io {
        path: file_path.to_path_buf(),
        source,
    })
}
