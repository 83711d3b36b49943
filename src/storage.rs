//! Durable key-value storage and the persisted-state accessor.
//!
//! [`KeyValueStore`] is the string-keyed backing store; [`FileStore`] keeps
//! one `<key>.json` file per entry in the data directory.  [`Persisted`]
//! wraps one key of a store and is the only thing that reads or writes it.
//!
//! Storage failures never propagate out of [`Persisted`]: a bad read falls
//! back to the default, a failed write is logged and the in-memory value
//! stays authoritative.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// String-keyed durable storage.
pub trait KeyValueStore {
    /// Raw value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`.  Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write-then-rename so a crash mid-write never leaves a torn file.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A value mirrored into one key of a [`KeyValueStore`].
pub struct Persisted<T> {
    store: Box<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    /// Load the value under `key`, falling back to `default` when the entry
    /// is absent, empty, unreadable or does not deserialize.
    pub fn load(store: Box<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let value = match store.get(&key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Stored value is malformed, using default");
                    default
                }
            },
            Ok(_) => default,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to read stored value, using default");
                default
            }
        };

        Self { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the in-memory value and write it through to the store.
    pub fn set(&mut self, value: T) {
        self.value = value;
        if let Err(e) = self.write() {
            tracing::error!(key = %self.key, error = %e, "Failed to persist value; keeping it in memory");
        }
    }

    /// Replace the in-memory value with `empty` and delete the stored entry
    /// outright, rather than persisting the empty value.
    pub fn clear(&mut self, empty: T) {
        self.value = empty;
        if let Err(e) = self.store.remove(&self.key) {
            tracing::error!(key = %self.key, error = %e, "Failed to remove stored value");
        }
    }

    fn write(&mut self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.value).map_err(StorageError::Serialize)?;
        self.store.set(&self.key, &raw)
    }
}
