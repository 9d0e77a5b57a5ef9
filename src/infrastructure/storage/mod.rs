//! Persistent key-value storage used by the local data store.
//!
//! Provides a [`KeyValueStorage`] trait with two implementations:
//! - [`FileStorage`] - JSON object file on disk, survives restarts
//! - [`MemoryStorage`] - In-process map for tests and throwaway runs

mod file_storage;
mod memory_storage;
mod service;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use service::{KeyValueStorage, StorageError, StorageResult};
