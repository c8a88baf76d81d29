//! Persistent client-side token storage.
//!
//! [`MemoryTokenStore`] keeps values for the process lifetime;
//! [`FileTokenStore`] persists them as a JSON object so a token survives
//! between runs, the way browser local storage does.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

/// Errors from reading or writing persisted tokens.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("IO error on token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value storage for credentials.
pub trait TokenStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

/// In-process token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, String>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry.
    #[must_use]
    pub fn with_token(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Token storage persisted to a JSON file.
///
/// The file is read once on open and rewritten on every change.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileTokenStore {
    /// Opens the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let path = path.into();
        let entries = DashMap::new();
        match std::fs::read(&path) {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => {}
            Ok(raw) => {
                let parsed: BTreeMap<String, String> =
                    serde_json::from_slice(&raw).map_err(|source| TokenStoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                for (key, value) in parsed {
                    entries.insert(key, value);
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(TokenStoreError::Io { path, source }),
        }
        debug!(path = %path.display(), entries = entries.len(), "token store opened");
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), TokenStoreError> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let raw = serde_json::to_vec_pretty(&snapshot).map_err(|source| {
            TokenStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| TokenStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, raw).map_err(|source| TokenStoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
