//! Azure Cognitive Search memory store over the REST API.
//!
//! Each collection is an index. Index names must be lowercase, and
//! document keys are restricted to URL-safe characters, so record keys are
//! stored base64url-encoded in the `Id` field.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use farmiq_core::memory::MemoryStore;
use farmiq_types::config::AzureCognitiveSearchConfig;
use farmiq_types::error::{ConfigError, RepositoryError};
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord, MemoryRecordMetadata};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check_status, request_failed};
use crate::http::{build_client, endpoint_url, key_headers};

const BACKEND: &str = "azure_cognitive_search";
pub const API_VERSION: &str = "2023-11-01";
const SELECT_FIELDS: &str = "Id,Text,Description,AdditionalMetadata,ExternalSourceName,IsReference";
const VECTOR_PROFILE: &str = "farmiq-vector-profile";
const VECTOR_ALGORITHM: &str = "farmiq-hnsw";

pub struct AzureCognitiveSearchMemoryStore {
    client: reqwest::Client,
    endpoint: String,
    vector_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchDocument {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    additional_metadata: String,
    #[serde(default)]
    external_source_name: String,
    #[serde(default)]
    is_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ScoredDocument {
    #[serde(rename = "@search.score")]
    score: f32,
    #[serde(flatten)]
    document: SearchDocument,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<ScoredDocument>,
}

/// Lowercase index name with anything outside `[a-z0-9-]` replaced by `-`.
pub fn index_name(collection: &str) -> String {
    collection
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

pub fn encode_key(key: &str) -> String {
    URL_SAFE.encode(key.as_bytes())
}

pub fn decode_key(encoded: &str) -> Result<String, RepositoryError> {
    let bytes = URL_SAFE
        .decode(encoded)
        .map_err(|e| RepositoryError::Query(format!("invalid document key '{encoded}': {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| RepositoryError::Query(format!("invalid document key '{encoded}': {e}")))
}

/// Azure reports cosine hits as `1 / (1 + (1 - cos))`; undo that.
fn score_to_relevance(score: f32) -> f32 {
    if score <= 0.0 {
        return -1.0;
    }
    2.0 - 1.0 / score
}

impl SearchDocument {
    fn from_record(record: &MemoryRecord) -> Self {
        Self {
            id: encode_key(&record.key),
            text: record.metadata.text.clone(),
            description: record.metadata.description.clone(),
            additional_metadata: record.metadata.additional_metadata.clone(),
            external_source_name: record.metadata.external_source_name.clone(),
            is_reference: record.metadata.is_reference,
            embedding: Some(record.embedding.clone()),
        }
    }

    fn into_parts(self) -> Result<(String, MemoryRecordMetadata, Option<Vec<f32>>), RepositoryError> {
        let key = decode_key(&self.id)?;
        let metadata = MemoryRecordMetadata {
            is_reference: self.is_reference,
            external_source_name: self.external_source_name,
            id: key.clone(),
            description: self.description,
            text: self.text,
            additional_metadata: self.additional_metadata,
        };
        Ok((key, metadata, self.embedding))
    }
}

impl AzureCognitiveSearchMemoryStore {
    pub fn new(config: &AzureCognitiveSearchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(key_headers("api-key", Some(&config.key))?)?,
            endpoint: endpoint_url(&config.endpoint, None)?,
            vector_size: config.vector_size,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn index_url(&self, collection: &str, path: &str) -> String {
        format!(
            "{}/indexes/{}{path}?api-version={API_VERSION}",
            self.endpoint,
            index_name(collection)
        )
    }

    fn index_schema(&self, collection: &str) -> serde_json::Value {
        json!({
            "name": index_name(collection),
            "fields": [
                { "name": "Id", "type": "Edm.String", "key": true, "filterable": true },
                { "name": "Text", "type": "Edm.String", "searchable": true },
                { "name": "Description", "type": "Edm.String", "searchable": true },
                { "name": "AdditionalMetadata", "type": "Edm.String" },
                { "name": "ExternalSourceName", "type": "Edm.String", "filterable": true },
                { "name": "IsReference", "type": "Edm.Boolean", "filterable": true },
                {
                    "name": "Embedding",
                    "type": "Collection(Edm.Single)",
                    "searchable": true,
                    "dimensions": self.vector_size,
                    "vectorSearchProfile": VECTOR_PROFILE
                }
            ],
            "vectorSearch": {
                "algorithms": [
                    { "name": VECTOR_ALGORITHM, "kind": "hnsw", "hnswParameters": { "metric": "cosine" } }
                ],
                "profiles": [
                    { "name": VECTOR_PROFILE, "algorithm": VECTOR_ALGORITHM }
                ]
            }
        })
    }

    async fn index_documents(&self, collection: &str, body: serde_json::Value) -> Result<(), RepositoryError> {
        let response = self
            .client
            .post(self.index_url(collection, "/docs/index"))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await?;
        Ok(())
    }
}

impl MemoryStore for AzureCognitiveSearchMemoryStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        let response = self
            .client
            .put(self.index_url(collection, ""))
            .json(&self.index_schema(collection))
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await?;
        tracing::info!(index = %index_name(collection), "Azure Cognitive Search index ready");
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        let response = self
            .client
            .get(self.index_url(collection, ""))
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(BACKEND, response).await?;
        Ok(true)
    }

    async fn upsert(&self, collection: &str, record: &MemoryRecord) -> Result<String, RepositoryError> {
        let mut document = serde_json::to_value(SearchDocument::from_record(record))
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        document["@search.action"] = json!("mergeOrUpload");
        self.index_documents(collection, json!({ "value": [document] })).await?;
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        let mut request = self
            .client
            .get(self.index_url(collection, &format!("/docs/{}", encode_key(key))));
        if !with_embedding {
            request = request.query(&[("$select", SELECT_FIELDS)]);
        }
        let response = request.send().await.map_err(|e| request_failed(BACKEND, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: SearchDocument = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid search response: {e}")))?;

        let (key, metadata, embedding) = document.into_parts()?;
        Ok(Some(MemoryRecord {
            key,
            metadata,
            embedding: embedding.unwrap_or_default(),
            timestamp: None,
        }))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        let body = json!({
            "value": [{ "@search.action": "delete", "Id": encode_key(key) }]
        });
        self.index_documents(collection, body).await
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        let select = if with_embeddings {
            format!("{SELECT_FIELDS},Embedding")
        } else {
            SELECT_FIELDS.to_string()
        };
        let body = json!({
            "vectorQueries": [{
                "kind": "vector",
                "vector": embedding,
                "fields": "Embedding",
                "k": limit
            }],
            "select": select,
            "top": limit
        });
        let response = self
            .client
            .post(self.index_url(collection, "/docs/search"))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let parsed: SearchResponse = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid search response: {e}")))?;

        let mut results = Vec::new();
        for hit in parsed.value {
            let relevance = score_to_relevance(hit.score);
            if relevance < min_relevance {
                continue;
            }
            let (_, metadata, vector) = hit.document.into_parts()?;
            results.push(MemoryQueryResult {
                metadata,
                relevance,
                embedding: if with_embeddings { vector } else { None },
            });
        }
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        Ok(results)
    }
}
