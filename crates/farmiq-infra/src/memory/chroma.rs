//! Chroma memory store over the v1 REST API.
//!
//! Chroma addresses collections by id for every record operation, so the
//! store resolves names once and caches the ids. Collections are created
//! in cosine space; relevance is `1 - distance`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use farmiq_core::memory::MemoryStore;
use farmiq_types::config::ChromaConfig;
use farmiq_types::error::{ConfigError, RepositoryError};
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord, MemoryRecordMetadata};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check_status, request_failed};
use crate::http::{build_client_with_crls, endpoint_url, warn_unchecked_revocation};

const BACKEND: &str = "chroma";

pub struct ChromaMemoryStore {
    client: reqwest::Client,
    base_url: String,
    collection_ids: DashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ChromaCollection {
    id: String,
}

/// Flat metadata stored beside each document. Chroma only accepts scalars.
#[derive(Debug, Serialize, Deserialize)]
struct ChromaMetadata {
    key: String,
    is_reference: bool,
    #[serde(default)]
    external_source_name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    additional_metadata: String,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    metadatas: Vec<Option<ChromaMetadata>>,
    #[serde(default)]
    documents: Vec<Option<String>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<f32>>>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    distances: Vec<Vec<f32>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<ChromaMetadata>>>,
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    embeddings: Option<Vec<Vec<Vec<f32>>>>,
}

impl ChromaMetadata {
    fn from_record(record: &MemoryRecord) -> Self {
        Self {
            key: record.key.clone(),
            is_reference: record.metadata.is_reference,
            external_source_name: record.metadata.external_source_name.clone(),
            id: record.metadata.id.clone(),
            description: record.metadata.description.clone(),
            additional_metadata: record.metadata.additional_metadata.clone(),
            timestamp: record.timestamp.map(|t| t.to_rfc3339()),
        }
    }

    fn into_metadata(self, text: String) -> MemoryRecordMetadata {
        MemoryRecordMetadata {
            is_reference: self.is_reference,
            external_source_name: self.external_source_name,
            id: self.id,
            description: self.description,
            text,
            additional_metadata: self.additional_metadata,
        }
    }
}

fn include(with_embeddings: bool, extra: &[&'static str]) -> Vec<&'static str> {
    let mut fields = vec!["metadatas", "documents"];
    fields.extend_from_slice(extra);
    if with_embeddings {
        fields.push("embeddings");
    }
    fields
}

impl ChromaMemoryStore {
    pub fn new(config: &ChromaConfig) -> Result<Self, ConfigError> {
        let base_url = endpoint_url(&config.host, Some(config.port))?;
        warn_unchecked_revocation("chroma", &base_url, &config.crl_files);
        Ok(Self {
            client: build_client_with_crls(HeaderMap::new(), &config.crl_files)?,
            base_url,
            collection_ids: DashMap::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_collection(&self, collection: &str) -> Result<Option<String>, RepositoryError> {
        let response = self
            .client
            .get(format!("{}/api/v1/collections/{collection}", self.base_url))
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let found: ChromaCollection = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid chroma response: {e}")))?;
        self.collection_ids.insert(collection.to_string(), found.id.clone());
        Ok(Some(found.id))
    }

    /// Collection id for `collection`, or `None` when Chroma has no such collection.
    async fn collection_id(&self, collection: &str) -> Result<Option<String>, RepositoryError> {
        if let Some(id) = self.collection_ids.get(collection) {
            return Ok(Some(id.clone()));
        }
        self.fetch_collection(collection).await
    }

    async fn require_collection_id(&self, collection: &str) -> Result<String, RepositoryError> {
        self.collection_id(collection)
            .await?
            .ok_or_else(|| RepositoryError::InvalidCollection(collection.to_string()))
    }

    async fn post(&self, collection_id: &str, operation: &str, body: serde_json::Value) -> Result<reqwest::Response, RepositoryError> {
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{collection_id}/{operation}",
                self.base_url
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        check_status(BACKEND, response).await
    }
}

impl MemoryStore for ChromaMemoryStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        let body = json!({
            "name": collection,
            "metadata": { "hnsw:space": "cosine" },
            "get_or_create": true,
        });
        let response = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed(BACKEND, e))?;
        let created: ChromaCollection = check_status(BACKEND, response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid chroma response: {e}")))?;

        tracing::debug!(collection, id = %created.id, "Chroma collection ready");
        self.collection_ids.insert(collection.to_string(), created.id);
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        Ok(self.fetch_collection(collection).await?.is_some())
    }

    async fn upsert(&self, collection: &str, record: &MemoryRecord) -> Result<String, RepositoryError> {
        let id = self.require_collection_id(collection).await?;
        let body = json!({
            "ids": [record.key],
            "embeddings": [record.embedding],
            "metadatas": [ChromaMetadata::from_record(record)],
            "documents": [record.metadata.text],
        });
        self.post(&id, "upsert", body).await?;
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        let Some(id) = self.collection_id(collection).await? else {
            return Ok(None);
        };
        let body = json!({ "ids": [key], "include": include(with_embedding, &[]) });
        let parsed: GetResponse = self
            .post(&id, "get", body)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid chroma response: {e}")))?;

        let Some(Some(metadata)) = parsed.metadatas.into_iter().next() else {
            return Ok(None);
        };
        let text = parsed.documents.into_iter().next().flatten().unwrap_or_default();
        let embedding = parsed
            .embeddings
            .and_then(|e| e.into_iter().next())
            .unwrap_or_default();
        let timestamp = metadata
            .timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Some(MemoryRecord {
            key: metadata.key.clone(),
            metadata: metadata.into_metadata(text),
            embedding,
            timestamp,
        }))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        let Some(id) = self.collection_id(collection).await? else {
            return Ok(());
        };
        self.post(&id, "delete", json!({ "ids": [key] })).await?;
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
        let Some(id) = self.collection_id(collection).await? else {
            return Ok(Vec::new());
        };
        let body = json!({
            "query_embeddings": [embedding],
            "n_results": limit,
            "include": include(with_embeddings, &["distances"]),
        });
        let parsed: QueryResponse = self
            .post(&id, "query", body)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid chroma response: {e}")))?;

        let distances = parsed.distances.into_iter().next().unwrap_or_default();
        let metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
        let mut documents = parsed.documents.into_iter().next().unwrap_or_default().into_iter();
        let mut embeddings = parsed
            .embeddings
            .and_then(|e| e.into_iter().next())
            .unwrap_or_default()
            .into_iter();

        let mut results = Vec::new();
        for (distance, metadata) in distances.into_iter().zip(metadatas) {
            let text = documents.next().flatten().unwrap_or_default();
            let vector = embeddings.next();
            let relevance = 1.0 - distance;
            let Some(metadata) = metadata else { continue };
            if relevance < min_relevance {
                continue;
            }
            results.push(MemoryQueryResult {
                metadata: metadata.into_metadata(text),
                relevance,
                embedding: if with_embeddings { vector } else { None },
            });
        }
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        Ok(results)
    }
}
