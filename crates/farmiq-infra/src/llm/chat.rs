//! OpenAI / Azure OpenAI chat completion client.

use farmiq_core::llm::LlmProvider;
use farmiq_types::config::AiServiceType;
use farmiq_types::error::{ConfigError, LlmError};
use farmiq_types::llm::{CompletionRequest, CompletionResponse, ProviderCapabilities, Usage};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use super::endpoint::OpenAiEndpoint;
use crate::http::build_client;

/// Chat completion provider for one model (or Azure deployment).
///
/// Does NOT derive Debug; the endpoint holds the API key.
pub struct OpenAiChatProvider {
    client: reqwest::Client,
    endpoint: OpenAiEndpoint,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: String,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiChatProvider {
    pub fn new(endpoint: OpenAiEndpoint, model: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(HeaderMap::new())?,
            provider_name: endpoint.service().to_string(),
            endpoint,
            model: model.to_string(),
            capabilities: capabilities_for(model),
        })
    }

    pub fn service(&self) -> AiServiceType {
        self.endpoint.service()
    }
}

fn capabilities_for(model: &str) -> ProviderCapabilities {
    let max_context_tokens = if model.starts_with("gpt-4o") {
        128_000
    } else if model.contains("32k") {
        32_768
    } else if model.contains("16k") {
        16_384
    } else if model.starts_with("gpt-4") {
        8_192
    } else {
        4_096
    };
    ProviderCapabilities {
        max_context_tokens,
        max_output_tokens: 4_096,
    }
}

impl LlmProvider for OpenAiChatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let span = tracing::info_span!(
            "gen_ai.complete",
            gen_ai.system = %self.provider_name,
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
        );
        self.send(request).instrument(span).await
    }
}

impl OpenAiChatProvider {
    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest("no messages".to_string()));
        }

        let body = ChatRequestBody {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatRequestMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let http_request = self
            .client
            .post(self.endpoint.url(&request.model, "chat/completions"))
            .json(&body);
        let response = self
            .endpoint
            .authorize(http_request)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: ChatResponseBody = response.json().await.map_err(|e| LlmError::Provider {
            message: format!("failed to parse response: {e}"),
        })?;

        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        let content = choice.message.content.ok_or(LlmError::EmptyResponse)?;
        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Completion received"
        );

        Ok(CompletionResponse {
            id: parsed.id,
            content,
            model: if parsed.model.is_empty() {
                request.model.clone()
            } else {
                parsed.model
            },
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}
