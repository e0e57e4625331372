//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use farmiq_types::error::{LlmError, RepositoryError, SkillError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Skill(SkillError),
    Repository(RepositoryError),
    Validation(String),
    NotFound(String),
}

impl From<SkillError> for AppError {
    fn from(e: SkillError) -> Self {
        match e {
            SkillError::Repository(inner) => AppError::Repository(inner),
            other => AppError::Skill(other),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    /// Status, machine-readable code and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Skill(SkillError::NotFound(name)) => {
                (StatusCode::NOT_FOUND, "SKILL_NOT_FOUND", format!("Skill '{name}' not found"))
            }
            AppError::Skill(e @ SkillError::FunctionNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "FUNCTION_NOT_FOUND", e.to_string())
            }
            AppError::Skill(e @ SkillError::MissingVariable(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Skill(e @ SkillError::ContentViolation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_VIOLATION", e.to_string())
            }
            AppError::Skill(SkillError::Llm(LlmError::RateLimited { .. })) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Completion provider rate limit reached".to_string(),
            ),
            AppError::Skill(e @ (SkillError::Llm(_) | SkillError::Safety(_))) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            AppError::Skill(e) => (StatusCode::INTERNAL_SERVER_ERROR, "SKILL_ERROR", e.to_string()),
            AppError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Entity not found".to_string())
            }
            AppError::Repository(e @ RepositoryError::InvalidCollection(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::debug!(code, error = %message, "Request rejected");
        }
        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::from(SkillError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (
                AppError::from(SkillError::ContentViolation { categories: "Hate".into() }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(SkillError::Llm(LlmError::RateLimited { retry_after_ms: None })),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AppError::from(SkillError::Llm(LlmError::AuthenticationFailed)), StatusCode::BAD_GATEWAY),
            (AppError::from(RepositoryError::Query("db".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (error, expected) in cases {
            assert_eq!(error.parts().0, expected, "{error:?}");
        }
    }

    #[test]
    fn test_repository_not_found_inside_skill_error_is_404() {
        let err = AppError::from(SkillError::Repository(RepositoryError::NotFound));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound("Session not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
