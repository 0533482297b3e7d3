//! Persistent key-value storage for JSON blobs.
//!
//! All durable state lives under three independent keys. Reads never fail:
//! an unavailable backing store or malformed JSON is logged and reported as
//! "absent", and callers fall back to defaults or sample data. Writes are
//! best-effort and surface a typed [`StoreError`] for the caller to log.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const CONVERSATIONS_KEY: &str = "conversations";
pub const SETTINGS_KEY: &str = "settings";
pub const SESSION_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Backing store unavailable: {0}")]
    Unavailable(#[source] std::io::Error),

    #[error("Backing store quota exceeded")]
    QuotaExceeded,

    #[error("Value could not be serialized: {0}")]
    Corrupt(#[source] serde_json::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`. Never errors: any read or parse
    /// failure yields `None`.
    async fn load(&self, key: &str) -> Option<Value>;

    /// Writes `value` under `key`, replacing whatever was there.
    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Deletes the value under `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
