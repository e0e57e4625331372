//! LlmProvider trait definition.
//!
//! This is the core abstraction that chat completion backends implement.

use farmiq_types::error::LlmError;
use farmiq_types::llm::{CompletionRequest, CompletionResponse, ProviderCapabilities};

/// Trait for chat completion backends (OpenAI, Azure OpenAI).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in farmiq-infra.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "azure_openai").
    fn name(&self) -> &str;

    /// Model or deployment this provider was configured for.
    ///
    /// Callers use it to fill `CompletionRequest::model`.
    fn model(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
