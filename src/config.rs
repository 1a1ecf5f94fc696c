//! Store and backend configuration.
//!
//! Both configuration types use the builder pattern via `typed-builder`.

use crate::error::FailureKind;
use std::path::PathBuf;
use typed_builder::TypedBuilder;

/// Default name of the reserved field holding the version tag.
pub const DEFAULT_VERSION_FIELD: &str = "__VERSION";

/// Where the version tag lives in the persisted blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionLayout {
    /// The tag is an extra top-level field of the document itself.
    KeyField(String),
    /// The blob is `{"version": <tag>, "document": <document>}`.
    Envelope,
}

impl Default for VersionLayout {
    fn default() -> Self {
        VersionLayout::KeyField(DEFAULT_VERSION_FIELD.to_string())
    }
}

impl VersionLayout {
    pub fn key_field<S: Into<String>>(name: S) -> Self {
        VersionLayout::KeyField(name.into())
    }

    /// The reserved field name, if the tag is embedded in the document.
    pub fn reserved_field(&self) -> Option<&str> {
        match self {
            VersionLayout::KeyField(name) => Some(name),
            VersionLayout::Envelope => None,
        }
    }
}

/// Failure policy and wire layout of a [`VersionedStore`](crate::VersionedStore).
///
/// Every `fail_on_*` switch defaults to `true` (raise). Turning one off makes
/// `load` return a fresh `initial()` state for that failure kind instead.
///
/// # Examples
///
/// ```
/// use keepsake::config::{StoreConfig, VersionLayout};
///
/// let config = StoreConfig::builder()
///     .fail_on_integrity_error(false)
///     .fail_on_upgrade_error(false)
///     .build();
/// assert!(config.fail_on_load_error);
/// assert_eq!(config.layout, VersionLayout::default());
///
/// let config = StoreConfig::builder().layout(VersionLayout::Envelope).build();
/// assert!(config.fail_on_integrity_error);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct StoreConfig {
    /// Raise when the upgraded document is missing a required field
    #[builder(default = true)]
    pub fail_on_integrity_error: bool,

    /// Raise when the version tag is unusable or a migration step fails
    #[builder(default = true)]
    pub fail_on_upgrade_error: bool,

    /// Raise when the backend cannot produce a parseable blob
    #[builder(default = true)]
    pub fail_on_load_error: bool,

    /// How the version tag is stored alongside the document
    #[builder(default)]
    pub layout: VersionLayout,

    /// Treat a blob without any version tag as version 1 instead of failing
    #[builder(default = false)]
    pub assume_first_version: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StoreConfig {
    /// Strict configuration: every load failure is raised.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient configuration: every load failure falls back to `initial()`.
    pub fn lenient() -> Self {
        Self::builder()
            .fail_on_integrity_error(false)
            .fail_on_upgrade_error(false)
            .fail_on_load_error(false)
            .build()
    }

    /// Whether a failure of `kind` is raised to the caller.
    ///
    /// Save and configuration failures are always raised.
    pub fn fails_hard(&self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::Integrity => self.fail_on_integrity_error,
            FailureKind::Upgrade => self.fail_on_upgrade_error,
            FailureKind::Load => self.fail_on_load_error,
            FailureKind::Save | FailureKind::Configuration => true,
        }
    }
}

/// Configuration for the file-based Sled backend.
///
/// # Examples
///
/// ```
/// use keepsake::config::FileConfig;
///
/// let config = FileConfig::builder()
///     .path("/data/app_state")
///     .cache_capacity_bytes(16 * 1024 * 1024)
///     .build();
/// assert!(config.flush_on_write);
/// assert!(!config.temporary);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct FileConfig {
    /// Path to the database directory
    #[builder(setter(into))]
    pub path: PathBuf,

    /// Name of the tree documents are stored in
    #[builder(default = String::from("documents"), setter(into))]
    pub tree: String,

    /// Page cache size in bytes
    #[builder(default = 64 * 1024 * 1024)]
    pub cache_capacity_bytes: u64,

    /// Remove the database when it is dropped
    #[builder(default = false)]
    pub temporary: bool,

    /// Flush to disk after every write
    #[builder(default = true)]
    pub flush_on_write: bool,
}

impl FileConfig {
    /// Create a basic configuration with just a path
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::builder().path(path).build()
    }

    /// Create configuration for a temporary database
    pub fn temp() -> Self {
        let path = std::env::temp_dir().join(format!(
            "keepsake_{}_{}",
            std::process::id(),
            unique_suffix()
        ));
        Self::builder().path(path).temporary(true).build()
    }
}

fn unique_suffix() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}
