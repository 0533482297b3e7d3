use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::agent::SimulatedAgent;
use crate::errors::AppError;
use crate::export::{self, ExportDocument};
use crate::models::{Conversation, Settings, User};
use crate::repo::conversation_repository::ConversationRepository;
use crate::service::chat_service::{ChatResponse, ChatService};
use crate::service::session_service::SessionService;
use crate::service::settings_service::SettingsService;
use crate::store::KeyValueStore;

/// Explicit application state: one instance owns the session, the
/// conversation flow, the settings, and the current-conversation pointer.
/// The presentation layer holds a `ChatApp` and calls into it; nothing here
/// touches rendering.
pub struct ChatApp {
    session: SessionService,
    chat: ChatService,
    settings: SettingsService,
    /// `None` means "new, unsaved chat".
    current_conversation: RwLock<Option<String>>,
}

impl ChatApp {
    pub async fn init(store: Arc<dyn KeyValueStore>) -> Self {
        Self::init_with_agent(store, SimulatedAgent::new()).await
    }

    pub async fn init_with_agent(store: Arc<dyn KeyValueStore>, agent: SimulatedAgent) -> Self {
        let session = SessionService::restore(store.clone()).await;
        let conversations = ConversationRepository::load(store.clone()).await;
        let settings = SettingsService::load(store).await;
        info!("Application state initialised");
        Self {
            session,
            chat: ChatService::new(conversations, agent),
            settings,
            current_conversation: RwLock::new(None),
        }
    }

    // ── Session ──────────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        self.session.authenticate(email, password).await
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, AppError> {
        self.session.register(email, password, name).await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    /// Ends the session and forgets the open conversation.
    pub async fn logout(&self) {
        self.session.logout().await;
        *self.current_conversation.write().await = None;
    }

    async fn require_user(&self) -> Result<User, AppError> {
        self.session
            .current_user()
            .await
            .ok_or(AppError::NotAuthenticated)
    }

    // ── Conversations ────────────────────────────────────────────────────────

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, AppError> {
        let user = self.require_user().await?;
        Ok(self.chat.conversations_for(&user.id).await)
    }

    pub async fn start_new_chat(&self) {
        *self.current_conversation.write().await = None;
    }

    pub async fn open_conversation(&self, id: &str) -> Result<Conversation, AppError> {
        let conversation = self.chat.open(id).await?;
        *self.current_conversation.write().await = Some(conversation.id.clone());
        Ok(conversation)
    }

    pub async fn current_conversation(&self) -> Option<Conversation> {
        let id = self.current_conversation.read().await.clone()?;
        self.chat.open(&id).await.ok()
    }

    /// Sends a message in the open conversation, creating one when none is
    /// open. The pointer tracks the (possibly new) conversation afterwards.
    pub async fn send(&self, content: &str) -> Result<ChatResponse, AppError> {
        let user = self.require_user().await?;
        let open_id = self.current_conversation.read().await.clone();

        let response = self
            .chat
            .send_message(&user.id, open_id.as_deref(), content)
            .await?;

        *self.current_conversation.write().await = Some(response.conversation.id.clone());
        Ok(response)
    }

    /// Deletes the open conversation and falls back to a fresh chat. Not
    /// having one open is reported but non-fatal for the caller.
    pub async fn delete_current_conversation(&self) -> Result<(), AppError> {
        let id = self
            .current_conversation
            .write()
            .await
            .take()
            .ok_or(AppError::NoActiveConversation)?;
        self.chat.delete(&id).await
    }

    // ── Export ───────────────────────────────────────────────────────────────

    pub async fn export_current_chat(&self) -> Result<ExportDocument, AppError> {
        let conversation = self
            .current_conversation()
            .await
            .ok_or(AppError::NoActiveConversation)?;
        Ok(export::conversation_export(&conversation))
    }

    pub async fn export_all_data(&self) -> Result<ExportDocument, AppError> {
        let user = self.require_user().await?;
        let conversations = self.chat.conversations_for(&user.id).await;
        let settings = self.settings.current().await;
        Ok(export::user_data_export(&user, &conversations, &settings))
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    pub async fn settings(&self) -> Settings {
        self.settings.current().await
    }

    pub async fn save_settings(&self, settings: Settings) {
        self.settings.save(settings).await;
    }

    pub async fn reset_settings(&self) -> Settings {
        self.settings.reset().await
    }
}
