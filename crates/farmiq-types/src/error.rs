use thiserror::Error;

/// Errors raised while loading configuration or composing services from it.
///
/// All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid memory store type '{0}'")]
    InvalidMemoryStoreType(String),

    #[error("store type is {store_type} but the [{section}] section is missing")]
    MissingSection { store_type: String, section: String },

    #[error("invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("invalid AI service type '{0}'")]
    InvalidAiServiceType(String),

    #[error("invalid chat store type '{0}'")]
    InvalidChatStoreType(String),

    #[error("missing configuration value: {0}")]
    MissingValue(String),

    #[error("failed to read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("invalid certificate revocation list '{path}': {reason}")]
    InvalidCrl { path: String, reason: String },
}

/// Errors from repository operations (memory stores and chat storage).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),
}

/// Errors from LLM and embedding provider operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("empty response from provider")]
    EmptyResponse,
}

/// Errors from content safety analysis.
#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("content safety request failed: {0}")]
    Request(String),

    #[error("content safety returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors raised while loading, registering or invoking skills.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("skill not found: {0}")]
    NotFound(String),

    #[error("function '{function}' not found in skill '{skill}'")]
    FunctionNotFound { skill: String, function: String },

    #[error("duplicate skill name '{0}'")]
    Duplicate(String),

    #[error("invalid skill manifest: {0}")]
    InvalidManifest(String),

    #[error("missing variable '{0}'")]
    MissingVariable(String),

    #[error("input rejected by content safety: {categories}")]
    ContentViolation { categories: String },

    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("safety error: {0}")]
    Safety(#[from] SafetyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_section_message_names_type_and_section() {
        let err = ConfigError::MissingSection {
            store_type: "qdrant".to_string(),
            section: "memory_store.qdrant".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "store type is qdrant but the [memory_store.qdrant] section is missing"
        );
    }

    #[test]
    fn test_skill_error_from_llm_error() {
        let err: SkillError = LlmError::EmptyResponse.into();
        assert!(matches!(err, SkillError::Llm(LlmError::EmptyResponse)));
        assert_eq!(err.to_string(), "llm error: empty response from provider");
    }

    #[test]
    fn test_content_violation_lists_categories() {
        let err = SkillError::ContentViolation {
            categories: "Hate, Violence".to_string(),
        };
        assert!(err.to_string().contains("Hate, Violence"));
    }
}
