use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{Conversation, Message, MessageRole};
use crate::store::{KeyValueStore, CONVERSATIONS_KEY};

/// Owns every conversation record, scoped by owning user. All mutations
/// write the full collection back through the store adapter; write failures
/// are logged and swallowed (persistence is best-effort).
#[derive(Clone)]
pub struct ConversationRepository {
    store: Arc<dyn KeyValueStore>,
    conversations: Arc<RwLock<Vec<Conversation>>>,
}

impl ConversationRepository {
    /// Rehydrates the collection from the store. An absent key seeds the
    /// sample conversations and persists them; a key that fails schema
    /// validation falls back to the samples without overwriting the store.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let conversations = match store.load(CONVERSATIONS_KEY).await {
            Some(value) => match serde_json::from_value::<Vec<Conversation>>(value) {
                Ok(list) => {
                    info!("Loaded {} stored conversation(s)", list.len());
                    list
                }
                Err(e) => {
                    warn!("Stored conversations did not match the expected schema: {e}");
                    sample_conversations()
                }
            },
            None => {
                let samples = sample_conversations();
                persist(store.as_ref(), &samples).await;
                samples
            }
        };
        Self {
            store,
            conversations: Arc::new(RwLock::new(conversations)),
        }
    }

    /// Conversations owned by `user_id`, most recent first. The sort is
    /// stable: identical `created_at` values keep insertion order.
    pub async fn list_by_user(&self, user_id: &str) -> Vec<Conversation> {
        let guard = self.conversations.read().await;
        let mut list: Vec<Conversation> = guard
            .iter()
            .filter(|c| c.owner_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Conversation> {
        self.conversations
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Insert-if-absent else replace-by-id, then persist. This is the
    /// implicit upsert behind appending a message to a not-yet-saved chat.
    pub async fn upsert(&self, conversation: Conversation) {
        let mut guard = self.conversations.write().await;
        match guard.iter_mut().find(|c| c.id == conversation.id) {
            Some(slot) => *slot = conversation,
            None => guard.push(conversation),
        }
        persist(self.store.as_ref(), &guard).await;
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut guard = self.conversations.write().await;
        let before = guard.len();
        guard.retain(|c| c.id != id);
        if guard.len() == before {
            return Err(AppError::not_found(id));
        }
        persist(self.store.as_ref(), &guard).await;
        Ok(())
    }
}

async fn persist(store: &dyn KeyValueStore, conversations: &[Conversation]) {
    let value = match serde_json::to_value(conversations) {
        Ok(value) => value,
        Err(e) => {
            error!("Could not serialize conversations: {e}");
            return;
        }
    };
    if let Err(e) = store.save(CONVERSATIONS_KEY, &value).await {
        warn!("Could not save conversations: {e}");
    }
}

/// Seed data shown to the demo user on a fresh installation.
fn sample_conversations() -> Vec<Conversation> {
    let now = Utc::now();
    let day_ago = now - Duration::days(1);
    let two_days_ago = now - Duration::days(2);

    let message = |role, content: &str, at| Message {
        id: uuid::Uuid::new_v4().to_string(),
        role,
        content: content.to_string(),
        timestamp: at,
    };

    vec![
        Conversation {
            id: "conv-1".to_string(),
            title: "Getting Started with AI".to_string(),
            owner_id: "1".to_string(),
            created_at: day_ago,
            messages: vec![
                message(
                    MessageRole::User,
                    "Hello, can you help me understand AI?",
                    day_ago,
                ),
                message(
                    MessageRole::Assistant,
                    "Hello! I'd be happy to help you understand AI. Artificial Intelligence \
                     refers to computer systems that can perform tasks typically requiring \
                     human intelligence, such as learning, reasoning, and problem-solving. \
                     What specific aspect of AI would you like to explore?",
                    day_ago + Duration::seconds(5),
                ),
            ],
        },
        Conversation {
            id: "conv-2".to_string(),
            title: "Web Development Tips".to_string(),
            owner_id: "1".to_string(),
            created_at: two_days_ago,
            messages: vec![
                message(
                    MessageRole::User,
                    "What are the best practices for React development?",
                    two_days_ago,
                ),
                message(
                    MessageRole::Assistant,
                    "Here are some key React best practices:\n\n1. Use functional components \
                     with hooks\n2. Keep components small and focused\n3. Use proper state \
                     management\n4. Implement error boundaries\n5. Optimize performance with \
                     React.memo\n6. Follow consistent naming conventions\n\nWould you like me \
                     to elaborate on any of these points?",
                    two_days_ago + Duration::seconds(8),
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn empty_repo() -> (MemoryStore, ConversationRepository) {
        let store = MemoryStore::new();
        // seed an empty collection so the samples stay out of the way
        store.inject(CONVERSATIONS_KEY, json!([])).await;
        let repo = ConversationRepository::load(Arc::new(store.clone())).await;
        (store, repo)
    }

    fn conversation_at(owner: &str, title: &str, created_at: chrono::DateTime<Utc>) -> Conversation {
        let mut c = Conversation::new(owner, title);
        c.created_at = created_at;
        c
    }

    #[tokio::test]
    async fn fresh_store_is_seeded_with_samples() {
        let store = MemoryStore::new();
        let repo = ConversationRepository::load(Arc::new(store.clone())).await;

        let list = repo.list_by_user("1").await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Getting Started with AI");
        // the seed is persisted so it survives a restart
        assert!(store.contains(CONVERSATIONS_KEY).await);
    }

    #[tokio::test]
    async fn corrupt_collection_falls_back_to_samples() {
        let store = MemoryStore::new();
        store
            .inject(CONVERSATIONS_KEY, json!({ "not": "an array" }))
            .await;

        let repo = ConversationRepository::load(Arc::new(store)).await;
        assert_eq!(repo.list_by_user("1").await.len(), 2);
    }

    #[tokio::test]
    async fn list_is_sorted_by_created_at_descending() {
        let (_store, repo) = empty_repo().await;
        let now = Utc::now();
        repo.upsert(conversation_at("u1", "oldest", now - Duration::hours(3)))
            .await;
        repo.upsert(conversation_at("u1", "newest", now)).await;
        repo.upsert(conversation_at("u1", "middle", now - Duration::hours(1)))
            .await;
        repo.upsert(conversation_at("u2", "other user", now)).await;

        let titles: Vec<String> = repo
            .list_by_user("u1")
            .await
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn identical_timestamps_keep_insertion_order() {
        let (_store, repo) = empty_repo().await;
        let at = Utc::now();
        for title in ["first", "second", "third"] {
            repo.upsert(conversation_at("u1", title, at)).await;
        }

        let titles: Vec<String> = repo
            .list_by_user("u1")
            .await
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let (_store, repo) = empty_repo().await;
        let mut conversation = Conversation::new("u1", "Before");
        repo.upsert(conversation.clone()).await;

        conversation
            .messages
            .push(Message::new(MessageRole::User, "hello"));
        repo.upsert(conversation.clone()).await;

        let list = repo.list_by_user("u1").await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn mutations_are_durably_observable() {
        let (store, repo) = empty_repo().await;
        repo.upsert(Conversation::new("u1", "Persisted")).await;

        // a second repository on the same store sees the write
        let reloaded = ConversationRepository::load(Arc::new(store)).await;
        assert_eq!(reloaded.list_by_user("u1").await.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_fails() {
        let (_store, repo) = empty_repo().await;
        let conversation = Conversation::new("u1", "Doomed");
        let id = conversation.id.clone();
        repo.upsert(conversation).await;

        repo.delete(&id).await.unwrap();
        assert!(repo.list_by_user("u1").await.is_empty());

        let err = repo.delete(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn write_failure_does_not_poison_in_memory_state() {
        let (store, repo) = empty_repo().await;
        store.fail_writes(true);
        repo.upsert(Conversation::new("u1", "Unsaved")).await;
        // the mutation survives in memory even though the write failed
        assert_eq!(repo.list_by_user("u1").await.len(), 1);
    }
}
