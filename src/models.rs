use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Titles derive from the first user message, cut at 50 characters.
const TITLE_MAX_CHARS: usize = 50;
/// Sidebar previews show at most 100 characters of the last message.
const PREVIEW_MAX_CHARS: usize = 100;

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// An authenticated identity. Deliberately carries no credential: the
/// plaintext demo password lives only in the session directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// ── Conversations & messages ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Immutable once created; ordering within a conversation is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An ordered thread of messages belonging to one user. Messages are
/// append-only; the title is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            owner_id: owner_id.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Lazily creates a fresh conversation for a first message, deriving the
    /// title from the message content.
    pub fn for_first_message(owner_id: impl Into<String>, content: &str) -> Self {
        Self::new(owner_id, Self::title_from(content))
    }

    pub fn title_from(content: &str) -> String {
        truncate_with_ellipsis(content.trim(), TITLE_MAX_CHARS)
    }

    /// Content of the last message, truncated for list views. Empty
    /// conversations yield a fixed sentinel.
    pub fn last_message_preview(&self) -> String {
        match self.messages.last() {
            None => "No messages".to_string(),
            Some(message) => truncate_with_ellipsis(&message.content, PREVIEW_MAX_CHARS),
        }
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotPersonality {
    #[default]
    Professional,
    Friendly,
    Casual,
    Technical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

fn default_true() -> bool {
    true
}

/// Singleton per installation, not per user. Every field carries a serde
/// default so a partial persisted object merges with the defaults on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub bot_personality: BotPersonality,
    #[serde(default)]
    pub response_length: ResponseLength,
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
    #[serde(default = "default_true")]
    pub enable_sounds: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_personality: BotPersonality::Professional,
            response_length: ResponseLength::Medium,
            enable_notifications: true,
            enable_sounds: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_is_verbatim_when_short() {
        assert_eq!(Conversation::title_from("hello there"), "hello there");
    }

    #[test]
    fn title_is_truncated_at_fifty_chars() {
        let content = "a".repeat(60);
        let title = Conversation::title_from(&content);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn preview_of_empty_conversation_is_sentinel() {
        let conversation = Conversation::new("1", "Empty");
        assert_eq!(conversation.last_message_preview(), "No messages");
    }

    #[test]
    fn preview_truncates_long_last_message() {
        let mut conversation = Conversation::new("1", "Long");
        conversation
            .messages
            .push(Message::new(MessageRole::User, "x".repeat(120)));
        let preview = conversation.last_message_preview();
        assert_eq!(preview, format!("{}...", "x".repeat(100)));
    }

    #[test]
    fn preview_is_last_message_not_first() {
        let mut conversation = Conversation::new("1", "Two");
        conversation
            .messages
            .push(Message::new(MessageRole::User, "first"));
        conversation
            .messages
            .push(Message::new(MessageRole::Assistant, "second"));
        assert_eq!(conversation.last_message_preview(), "second");
    }

    #[test]
    fn partial_settings_merge_with_defaults() {
        let settings: Settings =
            serde_json::from_value(json!({ "botPersonality": "friendly" })).unwrap();
        assert_eq!(settings.bot_personality, BotPersonality::Friendly);
        assert_eq!(settings.response_length, ResponseLength::Medium);
        assert!(settings.enable_notifications);
        assert!(settings.enable_sounds);
    }

    #[test]
    fn conversation_round_trips_through_json() {
        let mut conversation = Conversation::new("1", "Round trip");
        conversation
            .messages
            .push(Message::new(MessageRole::User, "hello"));
        let value = serde_json::to_value(&conversation).unwrap();
        assert!(value.get("ownerId").is_some(), "camelCase wire names");
        assert!(value.get("createdAt").is_some());
        let back: Conversation = serde_json::from_value(value).unwrap();
        assert_eq!(back, conversation);
    }
}
