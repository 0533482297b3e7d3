use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

/// Non-durable store backed by a map. Used by tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` report a quota failure, so callers'
    /// best-effort persistence paths can be exercised.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Injects a raw value, bypassing `save`. Lets tests seed a key with a
    /// shape the repositories will reject as corrupt.
    pub async fn inject(&self, key: &str, value: Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::QuotaExceeded);
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
