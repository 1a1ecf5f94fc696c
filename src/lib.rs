//! # Keepsake
//!
//! A versioned object store: persists one structured document per key in a
//! key/value backend, and on load migrates documents written by older
//! versions of the application forward before verifying they still have the
//! shape the application expects.
//!
//! ## Features
//!
//! - **Schema Evolution**: version-indexed migration steps, dynamic over JSON
//!   or typed between per-version schema structs
//! - **Integrity Checking**: every loaded document is checked against the
//!   field structure of the default state
//! - **Failure Policy**: integrity, upgrade and load failures can each be
//!   raised or replaced by a fresh default state
//! - **Backends**: in-memory, sled on disk, browser `localStorage` on wasm
//!
//! ## Quick Start
//!
//! ```rust
//! use keepsake::prelude::*;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct AppState {
//!     rounds: Vec<[String; 2]>,
//!     players: [String; 2],
//! }
//!
//! fn app_state() -> AppState {
//!     AppState {
//!         rounds: vec![],
//!         players: ["Player 1".into(), "Player 2".into()],
//!     }
//! }
//!
//! let migrations = MigrationTable::new().step(2, |mut doc| {
//!     doc["players"] = json!(["Player 1", "Player 2"]);
//!     Ok(doc)
//! });
//!
//! let backend = MemoryBackend::new();
//! // A document saved before players existed.
//! backend.set("match", r#"{"rounds": [], "__VERSION": 1}"#.into())?;
//!
//! let store = VersionedStore::new(backend, app_state, migrations, StoreConfig::default())?;
//! assert_eq!(store.current_version().get(), 2);
//!
//! let state = store.load("match")?;
//! assert_eq!(state.players[0], "Player 1");
//!
//! store.save("match", &state)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod migration;
pub mod prelude;
pub mod shape;
pub mod store;
pub mod version;

pub use error::{BackendError, FailureKind, StoreError, StoreResult};
pub use store::VersionedStore;
