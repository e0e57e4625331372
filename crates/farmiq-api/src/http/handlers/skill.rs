//! Skill HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/skills                     - Registered skills and their functions
//! - POST /api/v1/skills/{skill}/{function}  - Invoke a skill function

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use farmiq_types::skill::{ContextVariables, SkillInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub variables: ContextVariables,
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub skill: String,
    pub function: String,
    pub result: String,
}

/// GET /api/v1/skills
pub async fn list_skills(State(state): State<AppState>) -> Json<ApiResponse<Vec<SkillInfo>>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let skills = state.kernel.skills();
    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(skills, request_id, elapsed))
}

/// POST /api/v1/skills/{skill}/{function}
pub async fn invoke_function(
    State(state): State<AppState>,
    Path((skill, function)): Path<(String, String)>,
    Json(body): Json<InvokeRequest>,
) -> Result<Json<ApiResponse<InvokeResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let result = state.kernel.run(&skill, &function, body.variables).await?;
    tracing::debug!(skill = %skill, function = %function, "Skill function invoked over HTTP");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        InvokeResponse {
            skill,
            function,
            result,
        },
        request_id,
        elapsed,
    )))
}
