//! Azure AI Content Safety text analysis client.

use farmiq_core::safety::ContentSafety;
use farmiq_types::config::ContentSafetyConfig;
use farmiq_types::error::{ConfigError, SafetyError};
use farmiq_types::safety::{CategoryAnalysis, SafetyAnalysis};
use serde::Deserialize;
use serde_json::json;

use crate::http::{build_client, endpoint_url, key_headers};

pub const API_VERSION: &str = "2023-10-01";

pub struct AzureContentSafety {
    client: reqwest::Client,
    endpoint: String,
    violation_threshold: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeTextResponse {
    #[serde(default)]
    categories_analysis: Vec<CategoryAnalysis>,
}

impl AzureContentSafety {
    pub fn new(config: &ContentSafetyConfig) -> Result<Self, ConfigError> {
        let key = config
            .key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingValue("content_safety.key".to_string()))?;
        if config.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingValue("content_safety.endpoint".to_string()));
        }
        Ok(Self {
            client: build_client(key_headers("ocp-apim-subscription-key", Some(key))?)?,
            endpoint: endpoint_url(&config.endpoint, None)?,
            violation_threshold: config.violation_threshold,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ContentSafety for AzureContentSafety {
    fn violation_threshold(&self) -> u8 {
        self.violation_threshold
    }

    async fn analyze_text(&self, text: &str) -> Result<SafetyAnalysis, SafetyError> {
        let response = self
            .client
            .post(format!(
                "{}/contentsafety/text:analyze?api-version={API_VERSION}",
                self.endpoint
            ))
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| SafetyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SafetyError::Request(format!("HTTP {status}: {body}")));
        }

        let parsed: AnalyzeTextResponse = response
            .json()
            .await
            .map_err(|e| SafetyError::InvalidResponse(e.to_string()))?;

        tracing::debug!(categories = parsed.categories_analysis.len(), "Content analyzed");
        Ok(SafetyAnalysis {
            categories: parsed.categories_analysis,
        })
    }
}
