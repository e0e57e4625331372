//! Process-local chat storage on `DashMap`. Lost on restart.

use dashmap::DashMap;
use farmiq_core::chat::ChatRepository;
use farmiq_types::chat::{ChatMessage, ChatSession};
use farmiq_types::error::RepositoryError;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryChatRepository {
    sessions: DashMap<Uuid, ChatSession>,
    messages: DashMap<Uuid, Vec<ChatMessage>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        if self.sessions.contains_key(&session.id) {
            return Err(RepositoryError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        self.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self.sessions.get(session_id).map(|s| s.clone()))
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        if !self.sessions.contains_key(&message.session_id) {
            return Err(RepositoryError::NotFound);
        }
        self.messages
            .entry(message.session_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let Some(messages) = self.messages.get(session_id) else {
            return Ok(Vec::new());
        };
        let skip = limit
            .map(|l| messages.len().saturating_sub(l))
            .unwrap_or(0);
        Ok(messages.iter().skip(skip).cloned().collect())
    }
}
