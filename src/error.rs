//! Error types for each failure domain.
//!
//! None of these are fatal to the UI: fetch and storage errors are logged and
//! recovered from where they occur.  Only [`ConfigError`] escapes to `main`.

use thiserror::Error;

/// A single remote fetch failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("joke API responded with status {0}")]
    Status(u16),
    #[error("malformed joke payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Reading or writing the durable key-value store failed.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidVar(String, String),
    #[error("could not locate the user data directory")]
    NoDataDir,
}
