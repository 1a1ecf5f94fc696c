//! Prelude module for convenient imports.
//!
//! ```rust
//! use keepsake::prelude::*;
//! ```
//!
//! Brings in the store, its configuration, the migration traits and table,
//! the backend trait with the backends enabled for this target, and the error
//! types.

pub use crate::backend::{KeyValueBackend, MemoryBackend};
pub use crate::config::{FileConfig, StoreConfig, VersionLayout};
pub use crate::error::{BackendError, FailureKind, StoreError, StoreResult};
pub use crate::migration::{MigrateFrom, MigrationTable, Schema, TryMigrateFrom};
pub use crate::shape::Shape;
pub use crate::store::VersionedStore;
pub use crate::version::Version;

#[cfg(feature = "sled")]
pub use crate::backend::SledBackend;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use crate::backend::LocalStorageBackend;
