use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::warn;

use super::{KeyValueStore, StoreError};

const ENOSPC: i32 = 28;
const EDQUOT: i32 = 122;

/// Durable store keeping one `<key>.json` file per key under a data
/// directory. The directory is created lazily on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn classify(e: std::io::Error) -> StoreError {
        match e.raw_os_error() {
            Some(ENOSPC) | Some(EDQUOT) => StoreError::QuotaExceeded,
            _ => StoreError::Unavailable(e),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Malformed JSON in {}: {e}", path.display());
                None
            }
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await.map_err(Self::classify)?;
        let body = serde_json::to_vec_pretty(value).map_err(StoreError::Corrupt)?;
        // write-then-rename, so a crash mid-write cannot truncate the
        // previous value
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, body).await.map_err(Self::classify)?;
        fs::rename(&staging, self.path_for(key))
            .await
            .map_err(Self::classify)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::classify(e)),
        }
    }
}
