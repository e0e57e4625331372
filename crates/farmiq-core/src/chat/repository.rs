//! ChatRepository trait definition.

use farmiq_types::chat::{ChatMessage, ChatSession};
use farmiq_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in farmiq-infra (`InMemoryChatRepository`,
/// `SqliteChatRepository`). Uses native async fn in traits (RPITIT).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Save a new message within a session.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a session, ordered by created_at ASC.
    ///
    /// With `limit`, only the most recent `limit` messages are returned
    /// (still in chronological order).
    fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<usize>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
