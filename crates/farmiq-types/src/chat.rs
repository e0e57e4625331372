//! Chat session and message types for FarmIQ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::llm::MessageRole;

/// A chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(title: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title,
            created_at: Utc::now(),
        }
    }
}

/// A single persisted message within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(session_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_new_links_session() {
        let session = ChatSession::new(Some("Crops".to_string()));
        let message = ChatMessage::new(session.id, MessageRole::User, "hello");
        assert_eq!(message.session_id, session.id);
        assert_eq!(message.role, MessageRole::User);
        assert_ne!(message.id, session.id);
    }
}
