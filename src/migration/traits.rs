//! Typed migration traits for versioned state evolution.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// A historical (or the current) schema of a persisted state.
///
/// Each version of the state gets its own type. `VERSION` is the version a
/// document of this shape is tagged with.
///
/// ```
/// use keepsake::migration::Schema;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct MatchV1 {
///     rounds: Vec<[bool; 2]>,
/// }
///
/// impl Schema for MatchV1 {
///     const VERSION: u32 = 1;
/// }
///
/// assert_eq!(MatchV1::VERSION, 1);
/// ```
pub trait Schema: Serialize + DeserializeOwned {
    /// The version number of this schema. Must be at least 1.
    const VERSION: u32;
}

/// Trait for upgrading from an older schema to a newer one.
///
/// Implement this for every step of the chain; the store applies the steps in
/// ascending version order.
///
/// # Example
///
/// ```
/// use keepsake::migration::MigrateFrom;
///
/// struct MatchV1 {
///     rounds: Vec<[bool; 2]>,
/// }
///
/// struct MatchV2 {
///     rounds: Vec<[bool; 2]>,
///     players: [String; 2],
/// }
///
/// impl MigrateFrom<MatchV1> for MatchV2 {
///     fn migrate_from(old: MatchV1) -> Self {
///         MatchV2 {
///             rounds: old.rounds,
///             players: ["A".to_string(), "B".to_string()],
///         }
///     }
/// }
///
/// let v2 = MatchV2::migrate_from(MatchV1 { rounds: vec![[true, false]] });
/// assert_eq!(v2.rounds, vec![[true, false]]);
/// assert_eq!(v2.players[1], "B");
/// ```
pub trait MigrateFrom<OldVersion>: Sized {
    /// Convert from an older version to this version.
    fn migrate_from(old: OldVersion) -> Self;
}

/// Fallible counterpart of [`MigrateFrom`].
///
/// Every `MigrateFrom` implementation is also a `TryMigrateFrom` that never
/// fails. Implement this directly when an old document can hold values the
/// new schema has no representation for.
pub trait TryMigrateFrom<OldVersion>: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn try_migrate_from(old: OldVersion) -> Result<Self, Self::Error>;
}

impl<Old, New> TryMigrateFrom<Old> for New
where
    New: MigrateFrom<Old>,
{
    type Error = Infallible;

    fn try_migrate_from(old: Old) -> Result<Self, Self::Error> {
        Ok(New::migrate_from(old))
    }
}

/// The steps a single upgrade went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPath {
    /// The version the document was tagged with.
    pub from_version: u32,
    /// The version the document ended up at.
    pub to_version: u32,
    /// Versions whose registered migration ran, in order.
    pub applied: Vec<u32>,
}

impl MigrationPath {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}
