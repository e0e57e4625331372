//! Chat HTTP handler.
//!
//! Endpoint:
//! - POST /api/v1/chat - Run one chat turn, starting a session when none is given

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub memories_used: usize,
}

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let reply = state
        .chat
        .chat(state.kernel.services(), message, body.session_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let messages_link = format!("/api/v1/sessions/{}/messages", reply.session_id);
    let resp = ApiResponse::success(
        ChatResponse {
            session_id: reply.session_id,
            reply: reply.reply,
            memories_used: reply.memories_used,
        },
        request_id,
        elapsed,
    )
    .with_link("messages", &messages_link);

    Ok(Json(resp))
}
