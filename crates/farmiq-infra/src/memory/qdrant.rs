//! Qdrant memory store over the REST API.
//!
//! Collections map to Qdrant collections using cosine distance. Qdrant
//! point ids must be integers or UUIDs, so each record key is mapped to a
//! name-based UUID and the record key travels in the payload.

use chrono::{DateTime, Utc};
use farmiq_core::memory::MemoryStore;
use farmiq_types::config::QdrantConfig;
use farmiq_types::error::{ConfigError, RepositoryError};
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord, MemoryRecordMetadata};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{check_status, request_failed};
use crate::http::{build_client_with_crls, endpoint_url, key_headers, warn_unchecked_revocation};

const BACKEND: &str = "qdrant";

pub struct QdrantMemoryStore {
    client: reqwest::Client,
    base_url: String,
    vector_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointPayload {
    key: String,
    #[serde(flatten)]
    metadata: MemoryRecordMetadata,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct RetrievedPoint {
    payload: PointPayload,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: PointPayload,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

impl QdrantMemoryStore {
    pub fn new(config: &QdrantConfig) -> Result<Self, ConfigError> {
        let base_url = endpoint_url(&config.host, Some(config.port))?;
        warn_unchecked_revocation("qdrant", &base_url, &config.crl_files);
        let client = build_client_with_crls(
            key_headers("api-key", config.key.as_ref())?,
            &config.crl_files,
        )?;
        Ok(Self {
            client,
            base_url,
            vector_size: config.vector_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}", self.base_url)
    }

    /// Deterministic point id for a record key.
    pub fn point_id(key: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
    }
}

impl MemoryStore for QdrantMemoryStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        if self.does_collection_exist(collection).await? {
            return Ok(());
        }

        let body = json!({
            "vectors": { "size": self.vector_size, "distance": "Cosine" }
        });
        let response = self
            .client
            .put(self.collection_url(collection))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await?;

        tracing::info!(collection, vector_size = self.vector_size, "Qdrant collection created");
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        let response = self
            .client
            .get(self.collection_url(collection))
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
        let payload = PointPayload {
            key: record.key.clone(),
            metadata: record.metadata.clone(),
            timestamp: record.timestamp,
        };
        let body = json!({
            "points": [{
                "id": Self::point_id(&record.key),
                "vector": record.embedding,
                "payload": payload,
            }]
        });

        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url(collection)))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await?;
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        let body = json!({
            "ids": [Self::point_id(key)],
            "with_payload": true,
            "with_vector": with_embedding,
        });
        let response = self
            .client
            .post(format!("{}/points", self.collection_url(collection)))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let parsed: QdrantResponse<Vec<RetrievedPoint>> = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid qdrant response: {e}")))?;

        Ok(parsed.result.into_iter().next().map(|point| MemoryRecord {
            key: point.payload.key,
            metadata: point.payload.metadata,
            embedding: point.vector.unwrap_or_default(),
            timestamp: point.payload.timestamp,
        }))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        let body = json!({ "points": [Self::point_id(key)] });
        let response = self
            .client
            .post(format!("{}/points/delete?wait=true", self.collection_url(collection)))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await?;
        Ok(())
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        let body = json!({
            "vector": embedding,
            "limit": limit,
            "score_threshold": min_relevance,
            "with_payload": true,
            "with_vector": with_embeddings,
        });
        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url(collection)))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        let parsed: QdrantResponse<Vec<ScoredPoint>> = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid qdrant response: {e}")))?;

        Ok(parsed
            .result
            .into_iter()
            .map(|point| MemoryQueryResult {
                metadata: point.payload.metadata,
                relevance: point.score,
                embedding: if with_embeddings { point.vector } else { None },
            })
            .collect())
    }
}
