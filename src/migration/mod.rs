//! Schema migrations.
//!
//! A store knows its current version as the highest version registered in its
//! [`MigrationTable`]. A document loaded at version `t` passes through every
//! registered step in `t + 1 ..= current`, in order; versions with nothing
//! registered are identity transitions.
//!
//! Steps come in two flavours:
//!
//! - **Dynamic**: a function over the raw JSON document, for edits that do not
//!   warrant a type per version.
//! - **Typed**: each historical schema is its own [`Schema`] type and each
//!   step is a [`MigrateFrom`] (or [`TryMigrateFrom`]) conversion between two
//!   of them. The runtime only decides where in the chain a blob starts.
//!
//! # Example
//!
//! ```rust
//! use keepsake::migration::{MigrateFrom, MigrationTable, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct MatchV1 {
//!     rounds: Vec<[bool; 2]>,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct MatchV2 {
//!     rounds: Vec<[bool; 2]>,
//!     players: [String; 2],
//! }
//!
//! impl Schema for MatchV1 {
//!     const VERSION: u32 = 1;
//! }
//!
//! impl Schema for MatchV2 {
//!     const VERSION: u32 = 2;
//! }
//!
//! impl MigrateFrom<MatchV1> for MatchV2 {
//!     fn migrate_from(old: MatchV1) -> Self {
//!         MatchV2 {
//!             rounds: old.rounds,
//!             players: ["A".into(), "B".into()],
//!         }
//!     }
//! }
//!
//! let migrations = MigrationTable::new()
//!     .typed::<MatchV1, MatchV2>()
//!     .validate()
//!     .unwrap();
//! assert_eq!(migrations.current_version().get(), 2);
//! ```

mod table;
mod traits;

pub use table::*;
pub use traits::*;
