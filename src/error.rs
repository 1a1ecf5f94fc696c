use serde_json::Value;
use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The broad class a [`StoreError`] belongs to.
///
/// Failure policy is configured per kind, see
/// [`StoreConfig`](crate::config::StoreConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum FailureKind {
    /// The upgraded document is missing a field the canonical shape requires.
    Integrity,
    /// The version tag is unusable or a migration step failed.
    Upgrade,
    /// The backend could not produce a parseable blob.
    Load,
    /// The backend could not persist a blob.
    Save,
    /// The store itself was constructed with an invalid setup.
    Configuration,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Integrity Error: {message}")]
    Integrity { message: String, document: Value },

    #[error("Upgrade Error: {message}")]
    Upgrade {
        message: String,
        document: Value,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Load Error: {message}")]
    Load {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Save Error: {message}")]
    Save {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid migration at version {version}: {reason}")]
    InvalidMigration { version: u32, reason: String },

    #[error("State field '{field}' collides with the reserved version field")]
    ReservedField { field: String },

    #[error("Invalid state type: {0}")]
    InvalidState(String),
}

impl StoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StoreError::Integrity { .. } => FailureKind::Integrity,
            StoreError::Upgrade { .. } => FailureKind::Upgrade,
            StoreError::Load { .. } => FailureKind::Load,
            StoreError::Save { .. } => FailureKind::Save,
            StoreError::InvalidMigration { .. }
            | StoreError::ReservedField { .. }
            | StoreError::InvalidState(_) => FailureKind::Configuration,
        }
    }

    /// The document that failed, for integrity and upgrade failures.
    pub fn document(&self) -> Option<&Value> {
        match self {
            StoreError::Integrity { document, .. } | StoreError::Upgrade { document, .. } => {
                Some(document)
            }
            _ => None,
        }
    }

    pub(crate) fn integrity(message: impl Into<String>, document: Value) -> Self {
        StoreError::Integrity {
            message: message.into(),
            document,
        }
    }

    pub(crate) fn upgrade(message: impl Into<String>, document: Value) -> Self {
        StoreError::Upgrade {
            message: message.into(),
            document,
            source: None,
        }
    }

    pub(crate) fn load(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StoreError::Load {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn save(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StoreError::Save {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Errors raised by a [`KeyValueBackend`](crate::backend::KeyValueBackend).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored blob is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[cfg(feature = "sled")]
    #[error("There was an error with the Sled database")]
    Sled(#[from] sled::Error),
}
