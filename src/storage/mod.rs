//! Key-value persistence for progression state
//!
//! The engines only ever see the [`KeyValueStore`] trait. A store is probed
//! once at engine construction; if the probe fails the engine runs in
//! disabled, in-memory-only mode for the rest of the process.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, optionally with a byte quota
//! - [`FileStore`]: one JSON file per key in a directory
//! - [`SqliteStore`]: single `kv` table in a SQLite database

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key written and removed by [`probe`]
pub const PROBE_KEY: &str = "__quiz_rewards_probe__";

/// Errors surfaced by storage backends
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded writing {key} ({needed} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Lock,
}

/// Byte-oriented key-value store contract
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Check that a store can round-trip a value.
///
/// Writes a sentinel, reads it back and removes it again.
pub fn probe(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    let sentinel = b"probe";
    store.set(PROBE_KEY, sentinel)?;
    let read_back = store.get(PROBE_KEY)?;
    store.remove(PROBE_KEY)?;

    match read_back {
        Some(value) if value == sentinel => Ok(()),
        _ => Err(StorageError::Unavailable(
            "probe value did not round-trip".to_string(),
        )),
    }
}

/// Deserialize a JSON value stored under `key`.
///
/// Returns `Ok(None)` when the key is absent and an error when the stored
/// bytes cannot be parsed.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `key`
pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value)?;
    store.set(key, &bytes)
}
