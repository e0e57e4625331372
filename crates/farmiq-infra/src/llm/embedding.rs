//! OpenAI / Azure OpenAI embedding client.

use farmiq_core::memory::Embedder;
use farmiq_types::config::AiServiceType;
use farmiq_types::error::{ConfigError, RepositoryError};
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::endpoint::OpenAiEndpoint;
use crate::http::build_client;

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: OpenAiEndpoint,
    model: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(endpoint: OpenAiEndpoint, model: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(HeaderMap::new())?,
            endpoint,
            model: model.to_string(),
            dimension: dimension_for(model),
        })
    }

    pub fn service(&self) -> AiServiceType {
        self.endpoint.service()
    }
}

/// Output width of the known embedding models; 1536 otherwise.
fn dimension_for(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::json!({
            "input": texts,
            "model": self.model,
        });

        let request = self
            .client
            .post(self.endpoint.url(&self.model, "embeddings"))
            .json(&payload);
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| RepositoryError::Embedding(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Embedding(format!(
                "embedding API error {status}: {body}"
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RepositoryError::Embedding(format!("failed to parse response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(RepositoryError::Embedding(format!(
                "response data count mismatch: expected {}, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
