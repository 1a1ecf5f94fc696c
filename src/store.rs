//! The versioned store: one structured document per key, upgraded and
//! verified on every load.
//!
//! ```text
//! load:  backend -> blob -> JSON -> (document, tag) -> upgrade -> shape check -> T
//! save:  T -> JSON -> stamp current version -> backend
//! ```
//!
//! A failed load never writes anything back; only [`VersionedStore::save`]
//! and [`VersionedStore::remove`] touch the backend.

use crate::backend::KeyValueBackend;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::migration::{MigrationTable, Migrations};
use crate::shape::Shape;
use crate::version::{self, Tagged, Version, kind_name};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Persists values of `T` in a [`KeyValueBackend`], migrating documents
/// written by older versions of the application forward on load.
///
/// # Type Parameters
///
/// * `T` - The application state. Its default (from the `initial` factory)
///   defines the shape every loaded document must have.
/// * `B` - The backend; its `Key` is the document key type.
pub struct VersionedStore<T, B>
where
    B: KeyValueBackend,
{
    backend: B,
    initial: Factory<T>,
    migrations: Migrations,
    shape: Shape,
    config: StoreConfig,
}

impl<T, B> fmt::Debug for VersionedStore<T, B>
where
    B: KeyValueBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedStore")
            .field("migrations", &self.migrations)
            .field("shape", &self.shape)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T, B> VersionedStore<T, B>
where
    T: Serialize + DeserializeOwned,
    B: KeyValueBackend,
{
    /// Create a store.
    ///
    /// Fails immediately if the migration table is invalid (a version below 2,
    /// a duplicate, a typed step out of order), if the default state cannot
    /// carry an embedded version field, or if one of its fields is named like
    /// the reserved version field.
    pub fn new<F>(
        backend: B,
        initial: F,
        migrations: MigrationTable,
        config: StoreConfig,
    ) -> StoreResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let migrations = migrations.validate()?;

        let reference = serde_json::to_value(initial()).map_err(|e| {
            StoreError::InvalidState(format!("default state cannot be serialized: {e}"))
        })?;
        if let Some(field) = config.layout.reserved_field() {
            match &reference {
                Value::Object(fields) if fields.contains_key(field) => {
                    return Err(StoreError::ReservedField {
                        field: field.to_string(),
                    });
                }
                Value::Object(_) => {}
                other => {
                    return Err(StoreError::InvalidState(format!(
                        "default state serializes to {}, but the version field '{field}' needs an object",
                        kind_name(other)
                    )));
                }
            }
        }
        let shape = Shape::of_value(&reference);

        log::debug!(
            "Created store at version {} requiring fields {:?}",
            migrations.current_version(),
            shape.fields().collect::<Vec<_>>()
        );

        Ok(Self {
            backend,
            initial: Box::new(initial),
            migrations,
            shape,
            config,
        })
    }

    /// Create a store whose initial state is `T::default()`.
    pub fn with_default(
        backend: B,
        migrations: MigrationTable,
        config: StoreConfig,
    ) -> StoreResult<Self>
    where
        T: Default + 'static,
    {
        Self::new(backend, T::default, migrations, config)
    }

    /// Load the document stored under `key`, upgraded to the current version.
    ///
    /// Integrity, upgrade and load failures are returned or replaced by
    /// [`initial`](Self::initial) according to the store's [`StoreConfig`].
    pub fn load(&self, key: &B::Key) -> StoreResult<T> {
        match self.fetch(key) {
            Ok(state) => Ok(state),
            Err(err) if !self.config.fails_hard(err.kind()) => {
                log::warn!("Discarding document {key:?} ({err}), using initial state");
                Ok(self.initial())
            }
            Err(err) => Err(err),
        }
    }

    fn fetch(&self, key: &B::Key) -> StoreResult<T> {
        let raw = self
            .backend
            .get(key)
            .map_err(|e| StoreError::load(format!("backend could not read {key:?}"), e))?
            .ok_or_else(|| StoreError::Load {
                message: format!("no document stored under {key:?}"),
                source: None,
            })?;

        let blob: Value = serde_json::from_str(&raw)
            .map_err(|e| StoreError::load(format!("document {key:?} is not valid JSON"), e))?;

        let Tagged { document, tag } = version::split(blob, &self.config.layout);
        let version = match tag {
            Some(tag) => Version::from_tag(&tag).ok_or_else(|| {
                StoreError::upgrade(format!("Invalid version value: {tag}"), document.clone())
            })?,
            None if self.config.assume_first_version => Version::FIRST,
            None => return Err(StoreError::upgrade("Missing version field", document)),
        };

        let (document, path) = self.migrations.upgrade(document, version)?;
        if !path.is_noop() {
            log::debug!(
                "Upgraded {key:?} from version {} to {} via {:?}",
                path.from_version,
                path.to_version,
                path.applied
            );
        }

        if let Err(missing) = self.shape.check(&document) {
            return Err(StoreError::integrity(missing.to_string(), document));
        }

        let state = T::deserialize(&document).map_err(|e| {
            StoreError::integrity(format!("document does not match the state type: {e}"), document)
        })?;
        log::debug!("Loaded {key:?}");
        Ok(state)
    }

    /// Persist `value` under `key`, tagged with the current version.
    ///
    /// No validation is done; `value` is serialized as is. `value` itself is
    /// never modified.
    pub fn save(&self, key: &B::Key, value: &T) -> StoreResult<()> {
        let document = serde_json::to_value(value)
            .map_err(|e| StoreError::save("state could not be serialized", e))?;
        let blob = version::stamp(document, self.current_version(), &self.config.layout)?;

        self.backend
            .set(key, blob.to_string())
            .map_err(|e| StoreError::save(format!("backend could not write {key:?}"), e))?;
        log::debug!("Saved {key:?} at version {}", self.current_version());
        Ok(())
    }

    /// Delete whatever is stored under `key`.
    pub fn remove(&self, key: &B::Key) -> StoreResult<()> {
        self.backend
            .remove(key)
            .map_err(|e| StoreError::save(format!("backend could not remove {key:?}"), e))?;
        log::debug!("Removed {key:?}");
        Ok(())
    }

    /// A fresh default state.
    ///
    /// It belongs to the current version by construction: saving it tags it
    /// with [`current_version`](Self::current_version).
    pub fn initial(&self) -> T {
        log::debug!("Creating initial object.");
        (self.initial)()
    }
}

impl<T, B> VersionedStore<T, B>
where
    B: KeyValueBackend,
{
    /// The highest registered migration version, or 1.
    pub fn current_version(&self) -> Version {
        self.migrations.current_version()
    }

    /// The shape every loaded document must have.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::VersionLayout;
    use crate::error::FailureKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rules {
        coop: i32,
        defect: i32,
        win: i32,
        lose: i32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Match {
        rounds: Vec<u8>,
        rules: Rules,
    }

    fn new_state() -> Match {
        Match {
            rounds: vec![],
            rules: Rules {
                coop: 2,
                defect: 0,
                win: 3,
                lose: -1,
            },
        }
    }

    fn store(config: StoreConfig) -> VersionedStore<Match, MemoryBackend> {
        VersionedStore::new(MemoryBackend::new(), new_state, MigrationTable::new(), config)
            .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let store = store(StoreConfig::default());
        let mut state = new_state();
        state.rules.coop = 10;
        store.save("first", &state).unwrap();

        let first = store.load("first").unwrap();
        assert!(first.rounds.is_empty());
        assert_eq!(first.rules.coop, 10);
    }

    #[test]
    fn test_saved_blob_carries_version() {
        let store = store(StoreConfig::default());
        store.save("first", &new_state()).unwrap();

        let raw = store.backend().get("first").unwrap().unwrap();
        let blob: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(blob["__VERSION"], json!(1));
    }

    #[test]
    fn test_missing_key() {
        let strict = store(StoreConfig::default());
        let err = strict.load("nothing").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Load);

        let lenient = store(StoreConfig::builder().fail_on_load_error(false).build());
        assert_eq!(lenient.load("nothing").unwrap(), new_state());
    }

    #[test]
    fn test_malformed_json_is_a_load_failure() {
        let store = store(StoreConfig::default());
        store.backend().set("first", "{not json".into()).unwrap();
        assert_eq!(store.load("first").unwrap_err().kind(), FailureKind::Load);
    }

    #[test]
    fn test_untagged_document() {
        let strict = store(StoreConfig::default());
        strict
            .backend()
            .set("first", serde_json::to_string(&new_state()).unwrap())
            .unwrap();
        let err = strict.load("first").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Upgrade);
        assert_eq!(err.to_string(), "Upgrade Error: Missing version field");

        let assuming = VersionedStore::new(
            strict.into_backend(),
            new_state,
            MigrationTable::new(),
            StoreConfig::builder().assume_first_version(true).build(),
        )
        .unwrap();
        assert_eq!(assuming.load("first").unwrap(), new_state());
    }

    #[test]
    fn test_wrong_value_type_is_an_integrity_failure() {
        let store = store(StoreConfig::default());
        store
            .backend()
            .set(
                "first",
                json!({"rounds": "none", "rules": {"coop": 1, "defect": 0, "win": 3, "lose": -1}, "__VERSION": 1})
                    .to_string(),
            )
            .unwrap();
        let err = store.load("first").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Integrity);
        assert!(err.to_string().contains("does not match the state type"));
    }

    #[test]
    fn test_reserved_field_collision() {
        #[derive(Serialize, Deserialize)]
        struct Clashing {
            #[serde(rename = "__VERSION")]
            version: u32,
        }

        let err = VersionedStore::new(
            MemoryBackend::new(),
            || Clashing { version: 1 },
            MigrationTable::new(),
            StoreConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::ReservedField { ref field } if field == "__VERSION"));
        assert_eq!(err.kind(), FailureKind::Configuration);

        // The same type is fine when the tag lives outside the document.
        let envelope = StoreConfig::builder().layout(VersionLayout::Envelope).build();
        assert!(
            VersionedStore::new(
                MemoryBackend::new(),
                || Clashing { version: 1 },
                MigrationTable::new(),
                envelope,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_non_object_state_needs_envelope() {
        let err = VersionedStore::<Vec<u32>, _>::with_default(
            MemoryBackend::new(),
            MigrationTable::new(),
            StoreConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidState(_)));

        let store = VersionedStore::<Vec<u32>, _>::with_default(
            MemoryBackend::new(),
            MigrationTable::new(),
            StoreConfig::builder().layout(VersionLayout::Envelope).build(),
        )
        .unwrap();
        store.save("scores", &vec![3, 1, 2]).unwrap();
        assert_eq!(store.load("scores").unwrap(), [3, 1, 2]);
    }

    #[test]
    fn test_remove() {
        let store = store(StoreConfig::lenient());
        let mut state = new_state();
        state.rounds.push(1);
        store.save("first", &state).unwrap();
        store.remove("first").unwrap();
        assert_eq!(store.load("first").unwrap(), new_state());
    }

    #[test]
    fn test_with_default_uses_default_state() {
        #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
        struct Settings {
            volume: u8,
            players: Vec<String>,
        }

        let store: VersionedStore<Settings, _> = VersionedStore::with_default(
            MemoryBackend::new(),
            MigrationTable::new(),
            StoreConfig::lenient(),
        )
        .unwrap();
        assert_eq!(store.initial(), Settings::default());
        assert_eq!(store.load("missing").unwrap(), Settings::default());

        let settings = Settings {
            volume: 7,
            players: vec!["A".into()],
        };
        store.save("settings", &settings).unwrap();
        assert_eq!(store.load("settings").unwrap(), settings);
    }

    #[test]
    fn test_debug_output() {
        let store = store(StoreConfig::default());
        let debug = format!("{store:?}");
        assert!(debug.starts_with("VersionedStore"));
        assert!(debug.contains("current"));
    }
}
