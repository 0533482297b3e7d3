use thiserror::Error;

/// Top-level application error. All variants carry a human-readable message
/// for display by the presentation layer.
///
/// Store failures never show up here: the persistence adapter degrades to
/// defaults on read and logs on write (see [`crate::store`]).
#[derive(Debug, Error)]
pub enum AppError {
    // ── Authentication errors ────────────────────────────────────────────────
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("No user is signed in")]
    NotAuthenticated,

    // ── Conversation errors ──────────────────────────────────────────────────
    #[error("Conversation '{id}' not found")]
    ConversationNotFound { id: String },

    #[error("No conversation is currently open")]
    NoActiveConversation,

    #[error("A response is already being generated for conversation '{conversation_id}'")]
    ResponseInProgress { conversation_id: String },
}

impl AppError {
    pub fn not_found(id: impl Into<String>) -> Self {
        AppError::ConversationNotFound { id: id.into() }
    }

    pub fn empty_field(field_name: impl Into<String>) -> Self {
        AppError::EmptyField { field_name: field_name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ConversationNotFound { .. } | AppError::NoActiveConversation
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::EmptyField { .. })
    }
}
