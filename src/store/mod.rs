//! Key-value persistence behind the ledgers.
//!
//! Each ledger serializes its whole state to a single JSON document under a
//! fixed key. The backends are interchangeable: an in-memory map for tests,
//! per-key JSON files, or an embedded SQLite table.
//!
//! Durability is fire-and-forget: ledger mutations persist synchronously,
//! and a failed write is logged and otherwise ignored. A ledger that cannot
//! load its document starts from the default empty state.

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Storage keys, one JSON document per ledger.
pub const PROGRESS_KEY: &str = "progress-storage";
pub const ENGAGEMENT_KEY: &str = "engagement-storage";
pub const ACHIEVEMENTS_KEY: &str = "achievements-storage";
pub const NOTIFICATIONS_KEY: &str = "notifications-storage";

/// Version tag written into every persisted document.
pub const SCHEMA_VERSION: u32 = 1;

/// Error type shared by the storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A key-value store holding one JSON document per key
pub trait Store: Send + Sync {
    /// Read the document stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write (or replace) the document stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the document stored under `key`
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(serde::Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: u32,
}

pub(crate) fn default_version() -> u32 {
    SCHEMA_VERSION
}

/// Load a ledger document, falling back to the default state when the key
/// is absent, unreadable, malformed, or written by a newer schema.
pub(crate) fn load_state<T: DeserializeOwned + Default>(store: &dyn Store, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("Failed to load '{}', starting empty: {}", key, e);
            return T::default();
        }
    };

    if let Ok(probe) = serde_json::from_str::<VersionProbe>(&raw) {
        if probe.version > SCHEMA_VERSION {
            warn!(
                "'{}' was written by schema v{} (this build understands v{}), discarding",
                key, probe.version, SCHEMA_VERSION
            );
            return T::default();
        }
    }

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Failed to parse '{}', starting empty: {}", key, e);
        T::default()
    })
}

/// Persist a ledger document. Write failures are logged and swallowed; the
/// state then lives only in memory for the session.
pub(crate) fn persist_state<T: Serialize>(store: &dyn Store, key: &str, state: &T) {
    let json = match serde_json::to_string(state) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize '{}': {}", key, e);
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!("Failed to persist '{}': {}", key, e);
    }
}
