//! Local key-value storage
//!
//! A flat JSON object of string keys to string values. The store keeps its
//! base64 database snapshot here, and the locale preference sits beside it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Key holding the base64-encoded database snapshot
pub const DATABASE_KEY: &str = "agentic-sqlite-db";

/// Key holding the persisted locale code
pub const LOCALE_KEY: &str = "agentic-locale";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write storage file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("storage file {path:?} is not a JSON string map: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// String key-value storage backed by a single JSON file
///
/// A storage without a path lives only in memory; `save` is then a no-op.
#[derive(Debug, Default)]
pub struct Storage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl Storage {
    /// Load storage from a file; a missing file yields empty storage
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| StorageError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "loaded storage");

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Storage that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Write every entry back to disk
    pub fn save(&self) -> Result<(), StorageError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(path, content).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), keys = self.entries.len(), "saved storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempdir().unwrap();
        let storage = Storage::load(&tmp.path().join("storage.json")).unwrap();
        assert!(storage.get(DATABASE_KEY).is_none());
    }

    #[test]
    fn test_set_save_and_reload() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.json");

        let mut storage = Storage::load(&path).unwrap();
        storage.set(LOCALE_KEY, "en");
        storage.save().unwrap();

        let reloaded = Storage::load(&path).unwrap();
        assert_eq!(reloaded.get(LOCALE_KEY), Some("en"));
    }

    #[test]
    fn test_remove() {
        let mut storage = Storage::in_memory();
        storage.set("k", "v");
        assert_eq!(storage.remove("k").as_deref(), Some("v"));
        assert!(storage.get("k").is_none());
        storage.save().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = Storage::load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
