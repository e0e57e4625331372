//! Chat storage backends.
//!
//! `ChatStore` picks the backend named by `[chat_store]` and dispatches the
//! `ChatRepository` port to it.

pub mod memory;

use farmiq_core::chat::ChatRepository;
use farmiq_types::chat::{ChatMessage, ChatSession};
use farmiq_types::config::{ChatStoreConfig, ChatStoreType};
use farmiq_types::error::{ConfigError, RepositoryError};
use uuid::Uuid;

use crate::sqlite::chat::SqliteChatRepository;
use crate::sqlite::pool::DatabasePool;

pub use memory::InMemoryChatRepository;

/// Chat repository selected from configuration.
pub enum ChatStore {
    Volatile(InMemoryChatRepository),
    Sqlite(SqliteChatRepository),
}

impl ChatStore {
    /// Build the configured chat store. SQLite opens (and migrates) the database.
    pub async fn from_config(config: &ChatStoreConfig) -> anyhow::Result<Self> {
        match config.store_type()? {
            ChatStoreType::Volatile => Ok(ChatStore::Volatile(InMemoryChatRepository::new())),
            ChatStoreType::Sqlite => {
                let sqlite = config.sqlite.as_ref().ok_or_else(|| ConfigError::MissingSection {
                    store_type: ChatStoreType::Sqlite.to_string(),
                    section: "chat_store.sqlite".to_string(),
                })?;
                let pool = DatabasePool::open(&sqlite.path).await?;
                tracing::info!(path = %sqlite.path.display(), "Opened SQLite chat store");
                Ok(ChatStore::Sqlite(SqliteChatRepository::new(pool)))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatStore::Volatile(_) => "volatile",
            ChatStore::Sqlite(_) => "sqlite",
        }
    }
}

impl ChatRepository for ChatStore {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        match self {
            ChatStore::Volatile(repo) => repo.create_session(session).await,
            ChatStore::Sqlite(repo) => repo.create_session(session).await,
        }
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        match self {
            ChatStore::Volatile(repo) => repo.get_session(session_id).await,
            ChatStore::Sqlite(repo) => repo.get_session(session_id).await,
        }
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        match self {
            ChatStore::Volatile(repo) => repo.save_message(message).await,
            ChatStore::Sqlite(repo) => repo.save_message(message).await,
        }
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        match self {
            ChatStore::Volatile(repo) => repo.get_messages(session_id, limit).await,
            ChatStore::Sqlite(repo) => repo.get_messages(session_id, limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmiq_types::config::SqliteStoreConfig;

    #[tokio::test]
    async fn test_default_config_is_volatile() {
        let store = ChatStore::from_config(&ChatStoreConfig::default()).await.unwrap();
        assert_eq!(store.name(), "volatile");
    }

    #[tokio::test]
    async fn test_sqlite_without_section_fails() {
        let config = ChatStoreConfig {
            store_type: "sqlite".to_string(),
            sqlite: None,
        };
        let err = ChatStore::from_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("chat_store.sqlite"));
    }

    #[tokio::test]
    async fn test_sqlite_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChatStoreConfig {
            store_type: "sqlite".to_string(),
            sqlite: Some(SqliteStoreConfig {
                path: dir.path().join("chat.db"),
            }),
        };
        let store = ChatStore::from_config(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");

        let session = ChatSession::new(None);
        store.create_session(&session).await.unwrap();
        assert!(store.get_session(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_type_names_value() {
        let config = ChatStoreConfig {
            store_type: "cosmos".to_string(),
            sqlite: None,
        };
        let err = ChatStore::from_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("cosmos"));
    }
}
