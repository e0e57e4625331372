//! Semantic text memory.
//!
//! Pairs a memory store with an embedder so callers work with text: saving
//! embeds the text and upserts a record keyed by the caller's id, searching
//! embeds the query and returns the nearest records.

use std::sync::Arc;

use farmiq_types::error::RepositoryError;
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord};

use super::box_embedder::BoxEmbedder;
use super::box_store::BoxMemoryStore;

pub struct SemanticTextMemory {
    store: Arc<BoxMemoryStore>,
    embedder: BoxEmbedder,
}

impl SemanticTextMemory {
    pub fn new(store: Arc<BoxMemoryStore>, embedder: BoxEmbedder) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &Arc<BoxMemoryStore> {
        &self.store
    }

    pub fn embedder(&self) -> &BoxEmbedder {
        &self.embedder
    }

    /// Save a record that references an external source. Returns the stored key.
    pub async fn save_reference(
        &self,
        collection: &str,
        text: &str,
        external_id: &str,
        external_source_name: &str,
        description: &str,
    ) -> Result<String, RepositoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        let record = MemoryRecord::reference_record(
            external_id,
            external_source_name,
            description,
            text,
            embedding,
        );
        self.ensure_collection(collection).await?;
        self.store.upsert(collection, &record).await
    }

    /// Save locally authored information. Returns the stored key.
    pub async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: &str,
    ) -> Result<String, RepositoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        let record = MemoryRecord::local_record(id, text, description, embedding);
        self.ensure_collection(collection).await?;
        self.store.upsert(collection, &record).await
    }

    /// Records most relevant to `query`, best first.
    ///
    /// A collection that does not exist yet yields no results.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance: f32,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        if !self.store.does_collection_exist(collection).await? {
            tracing::debug!(collection, "search on missing collection");
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed_one(query).await?;
        let mut results = self
            .store
            .get_nearest_matches(collection, &embedding, limit, min_relevance, false)
            .await?;
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(limit);
        Ok(results)
    }

    pub async fn get(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        self.store.get(collection, key, false).await
    }

    pub async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        self.store.remove(collection, key).await
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        if !self.store.does_collection_exist(collection).await? {
            tracing::info!(collection, store = self.store.name(), "creating memory collection");
            self.store.create_collection(collection).await?;
        }
        Ok(())
    }
}
