use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::models::Settings;
use crate::store::{KeyValueStore, SETTINGS_KEY};

/// Loads and persists the installation-wide settings record. Loading never
/// fails: absent or malformed data yields the defaults, and a partial
/// persisted object is merged with them (persisted keys win).
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
    settings: Arc<RwLock<Settings>>,
}

impl SettingsService {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let settings = match store.load(SETTINGS_KEY).await {
            Some(value) => match serde_json::from_value::<Settings>(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Stored settings did not match the expected schema: {e}");
                    Settings::default()
                }
            },
            None => Settings::default(),
        };
        Self {
            store,
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub async fn current(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn save(&self, settings: Settings) {
        match serde_json::to_value(&settings) {
            Ok(value) => {
                if let Err(e) = self.store.save(SETTINGS_KEY, &value).await {
                    warn!("Could not save settings: {e}");
                }
            }
            Err(e) => warn!("Could not serialize settings: {e}"),
        }
        *self.settings.write().await = settings;
    }

    /// Restores the hardcoded defaults and persists them immediately.
    pub async fn reset(&self) -> Settings {
        let defaults = Settings::default();
        self.save(defaults.clone()).await;
        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BotPersonality, ResponseLength};
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        let svc = SettingsService::load(Arc::new(store.clone())).await;

        let custom = Settings {
            bot_personality: BotPersonality::Technical,
            response_length: ResponseLength::Long,
            enable_notifications: false,
            enable_sounds: false,
        };
        svc.save(custom.clone()).await;

        let reloaded = SettingsService::load(Arc::new(store)).await;
        assert_eq!(reloaded.current().await, custom);
    }

    #[tokio::test]
    async fn missing_record_yields_exact_defaults() {
        let svc = SettingsService::load(Arc::new(MemoryStore::new())).await;
        assert_eq!(svc.current().await, Settings::default());
    }

    #[tokio::test]
    async fn corrupt_record_yields_exact_defaults() {
        let store = MemoryStore::new();
        store.inject(SETTINGS_KEY, json!("not an object")).await;
        let svc = SettingsService::load(Arc::new(store)).await;
        assert_eq!(svc.current().await, Settings::default());
    }

    #[tokio::test]
    async fn partial_record_merges_with_defaults() {
        let store = MemoryStore::new();
        store
            .inject(SETTINGS_KEY, json!({ "enableSounds": false }))
            .await;
        let svc = SettingsService::load(Arc::new(store)).await;

        let settings = svc.current().await;
        assert!(!settings.enable_sounds);
        assert_eq!(settings.bot_personality, BotPersonality::Professional);
        assert!(settings.enable_notifications);
    }

    #[tokio::test]
    async fn reset_restores_and_persists_defaults() {
        let store = MemoryStore::new();
        let svc = SettingsService::load(Arc::new(store.clone())).await;
        svc.save(Settings {
            bot_personality: BotPersonality::Casual,
            ..Settings::default()
        })
        .await;

        assert_eq!(svc.reset().await, Settings::default());
        let reloaded = SettingsService::load(Arc::new(store)).await;
        assert_eq!(reloaded.current().await, Settings::default());
    }

    #[tokio::test]
    async fn failed_write_still_updates_in_memory() {
        let store = MemoryStore::new();
        let svc = SettingsService::load(Arc::new(store.clone())).await;
        store.fail_writes(true);

        let custom = Settings {
            response_length: ResponseLength::Short,
            ..Settings::default()
        };
        svc.save(custom.clone()).await;
        assert_eq!(svc.current().await, custom);
    }
}
