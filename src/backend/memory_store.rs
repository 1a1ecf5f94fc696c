use super::KeyValueBackend;
use crate::error::BackendError;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory backend keyed by string.
///
/// Useful for tests and for embedding applications that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing `(key, raw blob)` pairs.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, BackendError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.read()?.is_empty())
    }

    /// Copy of everything stored, for inspection.
    pub fn snapshot(&self) -> Result<HashMap<String, String>, BackendError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>, BackendError> {
        self.entries
            .read()
            .map_err(|_| BackendError::Unavailable("memory backend lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>, BackendError> {
        self.entries
            .write()
            .map_err(|_| BackendError::Unavailable("memory backend lock poisoned".into()))
    }
}

impl KeyValueBackend for MemoryBackend {
    type Key = str;

    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        self.write()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.write()?.remove(key);
        Ok(())
    }
}
