//! URL layout and authentication for OpenAI and Azure OpenAI.

use farmiq_types::config::{AiServiceConfig, AiServiceType};
use farmiq_types::error::ConfigError;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use crate::http::endpoint_url;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const AZURE_API_VERSION: &str = "2023-05-15";

/// Where and how to call an OpenAI-style API.
///
/// Does NOT derive Debug so the key cannot leak through formatting.
pub struct OpenAiEndpoint {
    service: AiServiceType,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiEndpoint {
    pub fn new(service: AiServiceType, base_url: &str, api_key: SecretString) -> Self {
        Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Resolve the endpoint from `[ai_service]`.
    ///
    /// Azure requires `endpoint`; OpenAI treats it as a base URL override.
    /// Both require `key`.
    pub fn from_config(config: &AiServiceConfig) -> Result<Self, ConfigError> {
        let service = config.service_type()?;
        let api_key = config
            .key
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().trim().to_string()))
            .ok_or_else(|| ConfigError::MissingValue("ai_service.key".to_string()))?;

        let base_url = match (service, config.endpoint.as_deref()) {
            (_, Some(endpoint)) if !endpoint.trim().is_empty() => endpoint_url(endpoint, None)?,
            (AiServiceType::OpenAi, _) => OPENAI_BASE_URL.to_string(),
            (AiServiceType::AzureOpenAi, _) => {
                return Err(ConfigError::MissingValue(
                    "ai_service.endpoint is required for azure_openai".to_string(),
                ));
            }
        };

        Ok(Self::new(service, &base_url, api_key))
    }

    pub fn service(&self) -> AiServiceType {
        self.service
    }

    /// Full URL for an operation (`embeddings`, `chat/completions`) on `model`.
    pub fn url(&self, model: &str, operation: &str) -> String {
        match self.service {
            AiServiceType::OpenAi => format!("{}/{operation}", self.base_url),
            AiServiceType::AzureOpenAi => format!(
                "{}/openai/deployments/{model}/{operation}?api-version={AZURE_API_VERSION}",
                self.base_url
            ),
        }
    }

    /// Attach the service's auth header.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.service {
            AiServiceType::OpenAi => request.bearer_auth(self.api_key.expose_secret()),
            AiServiceType::AzureOpenAi => request.header("api-key", self.api_key.expose_secret()),
        }
    }
}
