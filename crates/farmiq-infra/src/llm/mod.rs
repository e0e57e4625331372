//! OpenAI and Azure OpenAI clients.
//!
//! Both APIs share one wire format; [`endpoint::OpenAiEndpoint`] captures
//! the differences (URL layout and auth header) so the embedder and chat
//! provider are written once.

pub mod chat;
pub mod embedding;
pub mod endpoint;

use farmiq_core::llm::BoxLlmProvider;
use farmiq_core::memory::BoxEmbedder;
use farmiq_types::config::AiServiceConfig;
use farmiq_types::error::ConfigError;

pub use chat::OpenAiChatProvider;
pub use embedding::OpenAiEmbedder;
pub use endpoint::OpenAiEndpoint;

/// Build the embedder named by `[ai_service]`.
pub fn create_embedder(config: &AiServiceConfig) -> Result<BoxEmbedder, ConfigError> {
    let endpoint = OpenAiEndpoint::from_config(config)?;
    let embedder = OpenAiEmbedder::new(endpoint, &config.models.embedding)?;
    tracing::info!(
        service = %embedder.service(),
        model = %config.models.embedding,
        "Embedding provider configured"
    );
    Ok(BoxEmbedder::new(embedder))
}

/// Build a completion provider for `model` on the service named by `[ai_service]`.
pub fn create_completion_provider(
    config: &AiServiceConfig,
    model: &str,
) -> Result<BoxLlmProvider, ConfigError> {
    let endpoint = OpenAiEndpoint::from_config(config)?;
    let provider = OpenAiChatProvider::new(endpoint, model)?;
    tracing::info!(service = %provider.service(), model, "Completion provider configured");
    Ok(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_invalid_service_type() {
        let config = AiServiceConfig {
            service_type: "palm".to_string(),
            key: Some(SecretString::from("k")),
            ..Default::default()
        };
        let err = create_embedder(&config).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidAiServiceType(ref v) if v == "palm"));
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let config = AiServiceConfig {
            service_type: "azure_openai".to_string(),
            key: Some(SecretString::from("k")),
            ..Default::default()
        };
        let err = create_completion_provider(&config, "gpt-35-turbo").err().unwrap();
        assert!(matches!(err, ConfigError::MissingValue(_)));
    }

    #[test]
    fn test_openai_defaults() {
        let config = AiServiceConfig {
            key: Some(SecretString::from("sk")),
            ..Default::default()
        };
        let provider = create_completion_provider(&config, "gpt-35-turbo").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-35-turbo");
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-ada-002");
        assert_eq!(embedder.dimension(), 1536);
    }
}
