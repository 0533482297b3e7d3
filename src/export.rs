//! Pure serialization of conversations and full user datasets to
//! downloadable JSON documents. Actually delivering the file (download,
//! write to disk) is the presentation layer's job.

use chrono::Utc;
use serde_json::{json, Value};

use crate::models::{Conversation, Settings, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub body: Value,
}

impl ExportDocument {
    /// 2-space-indented JSON, ready to hand to a download mechanism.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Single-chat export: `{ title, createdAt, messages }`, named after the
/// conversation title with non-alphanumeric characters replaced.
pub fn conversation_export(conversation: &Conversation) -> ExportDocument {
    ExportDocument {
        filename: format!("{}.json", sanitize_filename(&conversation.title)),
        body: json!({
            "title": conversation.title,
            "createdAt": conversation.created_at,
            "messages": conversation.messages,
        }),
    }
}

/// Full export of one user's data, date-stamped generic filename.
pub fn user_data_export(
    user: &User,
    conversations: &[Conversation],
    settings: &Settings,
) -> ExportDocument {
    let now = Utc::now();
    ExportDocument {
        filename: format!("chatbot_data_{}.json", now.format("%Y-%m-%d")),
        body: json!({
            "user": user,
            "conversations": conversations,
            "settings": settings,
            "exportDate": now,
        }),
    }
}

fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessageRole, UserRole};

    fn two_message_conversation() -> Conversation {
        let mut conversation = Conversation::new("1", "Getting Started with AI");
        conversation
            .messages
            .push(Message::new(MessageRole::User, "first"));
        conversation
            .messages
            .push(Message::new(MessageRole::Assistant, "second"));
        conversation
    }

    #[test]
    fn conversation_export_preserves_title_and_order() {
        let conversation = two_message_conversation();
        let doc = conversation_export(&conversation);

        assert_eq!(doc.body["title"], "Getting Started with AI");
        let messages = doc.body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "first");
        assert_eq!(messages[1]["content"], "second");
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn filename_replaces_non_alphanumerics() {
        let doc = conversation_export(&two_message_conversation());
        assert_eq!(doc.filename, "Getting_Started_with_AI.json");
    }

    #[test]
    fn full_export_carries_all_sections() {
        let user = User {
            id: "1".to_string(),
            email: "demo@chatbot.com".to_string(),
            name: "Demo User".to_string(),
            role: UserRole::User,
        };
        let conversations = vec![two_message_conversation()];
        let doc = user_data_export(&user, &conversations, &Settings::default());

        assert!(doc.filename.starts_with("chatbot_data_"));
        assert!(doc.filename.ends_with(".json"));
        assert_eq!(doc.body["user"]["email"], "demo@chatbot.com");
        assert_eq!(doc.body["conversations"].as_array().unwrap().len(), 1);
        assert_eq!(doc.body["settings"]["botPersonality"], "professional");
        assert!(doc.body["exportDate"].is_string());
    }

    #[test]
    fn pretty_json_is_indented() {
        let doc = conversation_export(&two_message_conversation());
        let text = doc.to_pretty_json();
        assert!(text.contains("\n  \"title\""));
    }
}
