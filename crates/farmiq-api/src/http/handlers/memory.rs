//! Memory search HTTP handler.
//!
//! Endpoint:
//! - GET /api/v1/memory/search?query=&limit= - Farm records relevant to a query

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use farmiq_core::seed::FARM_COLLECTION;
use farmiq_types::memory::MemoryQueryResult;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_relevance: Option<f32>,
}

/// GET /api/v1/memory/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<MemoryQueryResult>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if params.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let limit = params
        .limit
        .unwrap_or(state.prompts.memory_result_limit)
        .clamp(1, MAX_LIMIT);
    let min_relevance = params
        .min_relevance
        .unwrap_or(state.prompts.memory_min_relevance);

    let results = state
        .kernel
        .memory()
        .search(FARM_COLLECTION, &params.query, limit, min_relevance)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(results, request_id, elapsed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    #[tokio::test]
    async fn test_search_returns_ranked_farm_records() {
        let Json(resp) = search(
            State(test_state().await),
            Query(SearchQuery {
                query: "nitrogen content in soil".to_string(),
                limit: Some(4),
                min_relevance: None,
            }),
        )
        .await
        .unwrap();
        let results = resp.data.unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].relevance >= w[1].relevance));
        assert!(results.iter().all(|r| r.metadata.external_source_name == "farmprediction"));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let err = search(
            State(test_state().await),
            Query(SearchQuery {
                query: " ".to_string(),
                limit: None,
                min_relevance: None,
            }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
