//! Backend abstraction layer.
//!
//! A backend is the durable medium a [`VersionedStore`](crate::VersionedStore)
//! reads and writes serialized documents from. It only ever sees opaque text
//! keyed by [`KeyValueBackend::Key`]; versioning, migration and validation all
//! happen above it.
//!
//! Provided implementations:
//!
//! - [`MemoryBackend`]: a process-local map, always available.
//! - [`SledBackend`]: a sled tree on disk (feature `sled`).
//! - [`LocalStorageBackend`]: the browser's `localStorage` (feature `wasm`,
//!   `wasm32` only).

pub mod memory_store;

#[cfg(feature = "sled")]
pub mod sled_store;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod local_storage_store;

pub use memory_store::MemoryBackend;

#[cfg(feature = "sled")]
pub use sled_store::SledBackend;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use local_storage_store::LocalStorageBackend;

use crate::error::BackendError;
use std::fmt::Debug;
use std::sync::Arc;

/// String-valued key/value medium.
///
/// Implementations must be synchronous: `get` returns what the last `set` on
/// the same key wrote, or `None` if nothing was written or it was removed.
pub trait KeyValueBackend {
    /// The document key type.
    type Key: ?Sized + Debug;

    /// Fetch the raw serialized text stored under `key`.
    fn get(&self, key: &Self::Key) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &Self::Key, value: String) -> Result<(), BackendError>;

    /// Remove whatever is stored under `key`. Removing a missing key is not an
    /// error.
    fn remove(&self, key: &Self::Key) -> Result<(), BackendError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for &B {
    type Key = B::Key;

    fn get(&self, key: &Self::Key) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &Self::Key, value: String) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &Self::Key) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Box<B> {
    type Key = B::Key;

    fn get(&self, key: &Self::Key) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &Self::Key, value: String) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &Self::Key) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    type Key = B::Key;

    fn get(&self, key: &Self::Key) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &Self::Key, value: String) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &Self::Key) -> Result<(), BackendError> {
        (**self).remove(key)
    }
}
