//! Session HTTP handlers.
//!
//! Endpoint:
//! - GET /api/v1/sessions/{id}/messages - Messages of a session, oldest first

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use farmiq_core::chat::ChatRepository;
use farmiq_types::chat::ChatMessage;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    /// Most recent N messages; all when absent.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let repository = state.chat.repository();

    repository
        .get_session(&sid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {sid} not found")))?;
    let messages = repository.get_messages(&sid, query.limit).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(messages, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}/messages"));

    Ok(Json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::chat::{ChatRequest, chat};
    use crate::state::testing::test_state;
    use farmiq_types::chat::MessageRole;

    #[tokio::test]
    async fn test_messages_after_chat_turn() {
        let state = test_state().await;
        let Json(reply) = chat(
            State(state.clone()),
            Json(ChatRequest {
                session_id: None,
                message: "Which crop for Nashik?".to_string(),
            }),
        )
        .await
        .unwrap();
        let session_id = reply.data.unwrap().session_id;

        let Json(resp) = get_messages(
            State(state.clone()),
            Path(session_id.to_string()),
            Query(MessageListQuery { limit: None }),
        )
        .await
        .unwrap();
        let messages = resp.data.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);

        let Json(limited) = get_messages(
            State(state),
            Path(session_id.to_string()),
            Query(MessageListQuery { limit: Some(1) }),
        )
        .await
        .unwrap();
        assert_eq!(limited.data.unwrap()[0].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_session() {
        let state = test_state().await;
        let err = get_messages(
            State(state.clone()),
            Path("not-a-uuid".to_string()),
            Query(MessageListQuery { limit: None }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Validation(_)));

        let err = get_messages(
            State(state),
            Path(Uuid::now_v7().to_string()),
            Query(MessageListQuery { limit: None }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
