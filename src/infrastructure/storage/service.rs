//! Key-value storage trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur while reading or writing storage.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Encoding(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Storage I/O error: {}", e),
            Self::Encoding(e) => write!(f, "Storage encoding error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String-keyed, string-valued persistent storage.
///
/// Mirrors the browser local-storage model: each key holds one opaque string,
/// and callers are responsible for serializing structured values.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::FileStorage`] - JSON file on disk
/// - [`crate::infrastructure::storage::MemoryStorage`] - in-process map
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}
