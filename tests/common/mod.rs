// Common test utilities and helpers
#![allow(dead_code)]

use keepsake::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub coop: i32,
    pub defect: i32,
    pub win: i32,
    pub lose: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            coop: 2,
            defect: 0,
            win: 3,
            lose: -1,
        }
    }
}

/// The state before players were introduced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Match {
    pub rounds: Vec<i64>,
    pub rules: Rules,
}

/// The state once a version 2 migration added players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWithPlayers {
    pub players: Vec<String>,
    pub rounds: Vec<i64>,
    pub rules: Rules,
}

impl Default for MatchWithPlayers {
    fn default() -> Self {
        MatchWithPlayers {
            players: default_players(),
            rounds: vec![],
            rules: Rules::default(),
        }
    }
}

pub fn default_players() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

/// Version 2 adds the default players.
pub fn players_migration() -> MigrationTable {
    MigrationTable::new().step(2, |mut doc| {
        doc["players"] = json!(default_players());
        Ok(doc)
    })
}

pub fn match_store(config: StoreConfig) -> VersionedStore<Match, MemoryBackend> {
    VersionedStore::with_default(MemoryBackend::new(), MigrationTable::new(), config)
        .expect("valid store")
}

pub fn players_store<B>(backend: B, config: StoreConfig) -> VersionedStore<MatchWithPlayers, B>
where
    B: KeyValueBackend,
{
    VersionedStore::with_default(backend, players_migration(), config).expect("valid store")
}

/// Write a raw JSON blob under `key`, bypassing the store.
pub fn put_raw<B>(backend: &B, key: &str, blob: Value)
where
    B: KeyValueBackend<Key = str>,
{
    backend.set(key, blob.to_string()).expect("raw write");
}

/// Read back the raw JSON blob under `key`.
pub fn get_raw<B>(backend: &B, key: &str) -> Option<Value>
where
    B: KeyValueBackend<Key = str>,
{
    backend
        .get(key)
        .expect("raw read")
        .map(|raw| serde_json::from_str(&raw).expect("stored blob is JSON"))
}
