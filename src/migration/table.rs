use super::traits::{MigrationPath, Schema, TryMigrateFrom};
use crate::error::{StoreError, StoreResult};
use crate::version::Version;
use anyhow::Context;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single upgrade step: takes a document at version `v - 1` and returns it
/// at version `v`.
pub type MigrationFn = Box<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

struct Step {
    version: u32,
    /// Source version of a typed step.
    source: Option<u32>,
    run: MigrationFn,
}

/// Migrations as registered, before validation.
///
/// Steps can be given as plain functions over JSON documents or as typed
/// [`Schema`] conversions. Validation happens when the table is handed to
/// [`VersionedStore::new`](crate::VersionedStore::new).
///
/// ```
/// use keepsake::migration::MigrationTable;
/// use serde_json::json;
///
/// let table = MigrationTable::new()
///     .step(2, |mut doc| {
///         doc["players"] = json!(["A", "B"]);
///         Ok(doc)
///     })
///     .step(4, |doc| Ok(doc));
///
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Default)]
pub struct MigrationTable {
    steps: Vec<Step>,
}

impl fmt::Debug for MigrationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationTable")
            .field(
                "versions",
                &self.steps.iter().map(|s| s.version).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl MigrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `migration` as the step that produces version `version`.
    pub fn step<F>(mut self, version: u32, migration: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.steps.push(Step {
            version,
            source: None,
            run: Box::new(migration),
        });
        self
    }

    /// Register the typed conversion `Old -> New` as the step producing
    /// `New::VERSION`.
    ///
    /// The document is deserialized as `Old`, converted and serialized back,
    /// so fields `Old` does not declare do not survive this step.
    pub fn typed<Old, New>(mut self) -> Self
    where
        Old: Schema + 'static,
        New: Schema + TryMigrateFrom<Old> + 'static,
    {
        let run = |document: Value| -> anyhow::Result<Value> {
            let old: Old = serde_json::from_value(document).with_context(|| {
                format!("document does not match the version {} schema", Old::VERSION)
            })?;
            let new = New::try_migrate_from(old)?;
            Ok(serde_json::to_value(new)?)
        };
        self.steps.push(Step {
            version: New::VERSION,
            source: Some(Old::VERSION),
            run: Box::new(run),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check the registered steps and index them by version.
    pub fn validate(self) -> StoreResult<Migrations> {
        let invalid = |version: u32, reason: String| StoreError::InvalidMigration { version, reason };

        let mut steps: BTreeMap<Version, MigrationFn> = BTreeMap::new();
        let mut typed_sources = Vec::new();

        for step in self.steps {
            let version = match Version::new(step.version) {
                Some(version) if version > Version::FIRST => version,
                _ => return Err(invalid(step.version, "versions must be above 1".into())),
            };
            if let Some(source) = step.source {
                if source == 0 || source >= step.version {
                    return Err(invalid(
                        step.version,
                        format!("typed step starts from version {source}, which is not below it"),
                    ));
                }
                typed_sources.push((source, step.version));
            }
            if steps.insert(version, step.run).is_some() {
                return Err(invalid(step.version, "registered more than once".into()));
            }
        }

        for (source, target) in typed_sources {
            let between = steps
                .keys()
                .map(|v| v.get())
                .find(|v| *v > source && *v < target);
            if let Some(between) = between {
                return Err(invalid(
                    target,
                    format!(
                        "typed step from version {source} skips the step registered at version {between}"
                    ),
                ));
            }
        }

        let current = steps.keys().next_back().copied().unwrap_or(Version::FIRST);
        Ok(Migrations { steps, current })
    }
}

/// A validated migration table.
pub struct Migrations {
    steps: BTreeMap<Version, MigrationFn>,
    current: Version,
}

impl fmt::Debug for Migrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrations")
            .field("versions", &self.steps.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl Migrations {
    /// The highest registered version, or 1 when nothing is registered.
    pub fn current_version(&self) -> Version {
        self.current
    }

    /// Registered versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = Version> + '_ {
        self.steps.keys().copied()
    }

    /// Bring `document`, tagged `from`, up to the current version.
    ///
    /// Every registered step above `from` runs exactly once, in ascending
    /// order; unregistered versions are skipped. If a step fails, the failure
    /// carries the document as it was before the first step.
    pub fn upgrade(&self, document: Value, from: Version) -> StoreResult<(Value, MigrationPath)> {
        if from > self.current {
            return Err(StoreError::upgrade(
                format!(
                    "Invalid version number: {from} (current version is {})",
                    self.current
                ),
                document,
            ));
        }

        let mut path = MigrationPath {
            from_version: from.get(),
            to_version: from.get(),
            applied: Vec::new(),
        };
        if from == self.current {
            return Ok((document, path));
        }

        let original = document.clone();
        let mut document = document;
        for (version, step) in self.steps.range(from.next()..) {
            log::debug!("Applying migration to version {version}");
            document = step(document).map_err(|cause| StoreError::Upgrade {
                message: format!("Upgrade to version {version} failed"),
                document: original.clone(),
                source: Some(cause.into()),
            })?;
            path.applied.push(version.get());
        }
        path.to_version = self.current.get();

        log::debug!("Object upgraded to version {}", self.current);
        Ok((document, path))
    }
}
