use super::KeyValueBackend;
use crate::config::FileConfig;
use crate::error::BackendError;
use std::path::Path;

/// On-disk backend storing each document as one entry of a sled tree.
pub struct SledBackend {
    db: sled::Db,
    tree: sled::Tree,
    flush_on_write: bool,
}

impl SledBackend {
    /// Open (or create) a database from `config`.
    pub fn open(config: &FileConfig) -> Result<Self, BackendError> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity_bytes)
            .temporary(config.temporary)
            .open()?;
        let tree = db.open_tree(config.tree.as_bytes())?;
        log::debug!("Opened sled backend at {}", config.path.display());
        Ok(Self {
            db,
            tree,
            flush_on_write: config.flush_on_write,
        })
    }

    /// Open a database at `path` with default settings
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        Self::open(&FileConfig::new(path.as_ref()))
    }

    /// Create a temporary database (useful for testing)
    pub fn temp() -> Result<Self, BackendError> {
        Self::open(&FileConfig::temp())
    }

    /// Get direct access to the underlying sled database
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Flush the database to disk
    pub fn flush(&self) -> Result<usize, BackendError> {
        Ok(self.db.flush()?)
    }
}

impl KeyValueBackend for SledBackend {
    type Key = str;

    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(String::from_utf8(bytes.to_vec())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        self.tree.insert(key.as_bytes(), value.into_bytes())?;
        if self.flush_on_write {
            self.tree.flush()?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.tree.remove(key.as_bytes())?;
        if self.flush_on_write {
            self.tree.flush()?;
        }
        Ok(())
    }
}
