//! Typed JSON persistence over a [`KeyValueStore`]
//!
//! Loads never fail: missing or unparsable blobs come back as `None` and the
//! caller substitutes its default. Saves are fire-and-forget; faults are
//! logged and dropped so gameplay is never blocked by storage.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::platform::{KeyValueStore, StorageError};

/// Storage key for [`crate::Settings`]
pub const SETTINGS_KEY: &str = "bubble_rush_settings";
/// Storage key for the score history array
pub const SCORES_KEY: &str = "bubble_rush_scores";
/// Storage key for the completed challenge id array
pub const CHALLENGES_KEY: &str = "bubble_rush_challenges";

/// Failure persisting a value
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Read a key as loosely-typed JSON
pub fn load_value(store: &dyn KeyValueStore, key: &str) -> Option<Value> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read {key}: {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding malformed {key}: {e}");
            None
        }
    }
}

/// Read a key as a concrete type
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = load_value(store, key)?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Discarding {key} with unexpected shape: {e}");
            None
        }
    }
}

/// Serialize and write a value, reporting failures
pub fn try_save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    Ok(())
}

/// Serialize and write a value, logging and ignoring failures
pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match try_save_json(store, key, value) {
        Ok(()) => log::debug!("Saved {key}"),
        Err(e) => log::warn!("Failed to save {key}: {e}"),
    }
}
