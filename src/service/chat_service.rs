use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::agent::SimulatedAgent;
use crate::errors::AppError;
use crate::models::{Conversation, Message, MessageRole};
use crate::repo::conversation_repository::ConversationRepository;

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub conversation: Conversation,
    pub reply: Message,
}

/// Drives a message exchange: validates input, lazily creates the
/// conversation, appends both sides of the turn, and persists after each
/// append. At most one send may be in flight per conversation; a second
/// send while one is pending is rejected.
#[derive(Clone)]
pub struct ChatService {
    conversations: ConversationRepository,
    agent: SimulatedAgent,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ChatService {
    pub fn new(conversations: ConversationRepository, agent: SimulatedAgent) -> Self {
        Self {
            conversations,
            agent,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Sends `content` on behalf of `user_id`. With no `conversation_id` a
    /// fresh conversation is created, titled from the message. The returned
    /// conversation already contains both the user message and the reply,
    /// and both appends are durably observable when this returns.
    ///
    /// The exchange itself runs on a detached task: dropping this future
    /// mid-delay (the UI navigating away, a timeout) neither loses the
    /// pending reply nor leaves the conversation marked busy.
    pub async fn send_message(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
        content: &str,
    ) -> Result<ChatResponse, AppError> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::empty_field("message"));
        }

        let mut conversation = match conversation_id {
            Some(id) => self
                .conversations
                .find_by_id(id)
                .await
                .ok_or_else(|| AppError::not_found(id))?,
            None => {
                let conversation = Conversation::for_first_message(user_id, &content);
                info!(id = %conversation.id, "Created conversation");
                conversation
            }
        };

        {
            let mut pending = lock(&self.in_flight);
            if !pending.insert(conversation.id.clone()) {
                return Err(AppError::ResponseInProgress {
                    conversation_id: conversation.id.clone(),
                });
            }
        }

        let exchange = tokio::spawn({
            let service = self.clone();
            async move {
                // returns the conversation to idle however this task ends
                let _idle = InFlightGuard {
                    in_flight: service.in_flight.clone(),
                    id: conversation.id.clone(),
                };

                conversation
                    .messages
                    .push(Message::new(MessageRole::User, content.clone()));
                service.conversations.upsert(conversation.clone()).await;

                // the only latency suspension point; cannot fail
                let reply_text = service.agent.generate_reply(&content).await;

                let reply = Message::new(MessageRole::Assistant, reply_text);
                conversation.messages.push(reply.clone());
                service.conversations.upsert(conversation.clone()).await;

                debug!(
                    id = %conversation.id,
                    messages = conversation.messages.len(),
                    "Exchange complete"
                );
                ChatResponse { conversation, reply }
            }
        });

        // a join error here can only mean the exchange task panicked;
        // re-raise the panic rather than inventing an error kind for it
        Ok(exchange.await.expect("message exchange task panicked"))
    }

    pub async fn conversations_for(&self, user_id: &str) -> Vec<Conversation> {
        self.conversations.list_by_user(user_id).await
    }

    pub async fn open(&self, conversation_id: &str) -> Result<Conversation, AppError> {
        self.conversations
            .find_by_id(conversation_id)
            .await
            .ok_or_else(|| AppError::not_found(conversation_id))
    }

    pub async fn delete(&self, conversation_id: &str) -> Result<(), AppError> {
        self.conversations.delete(conversation_id).await
    }
}

fn lock(in_flight: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears a conversation's busy flag when the exchange ends, including by
/// unwinding.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.id);
    }
}
