//! Storage media for tokens
//!
//! - [`MemoryStorage`]: process-local map, the default for interactive use
//! - [`NoopStorage`]: detached storage for contexts without persistence
//!   (server-side rendering, batch jobs); every read is empty

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use super::traits::KeyValueStorage;

/// Storage medium errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Medium is not available in this environment
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the operation
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// In-memory key/value storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no keys are stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Storage that never persists anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl KeyValueStorage for NoopStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
