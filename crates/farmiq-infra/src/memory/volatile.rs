//! Process-local, non-persistent memory store.

use dashmap::DashMap;
use farmiq_core::memory::MemoryStore;
use farmiq_core::memory::store::cosine_similarity;
use farmiq_types::error::RepositoryError;
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord};

/// In-process vector store. Contents are lost when the process exits.
///
/// Collections map keys to records; upserting an existing key replaces it.
#[derive(Debug, Default)]
pub struct VolatileMemoryStore {
    collections: DashMap<String, DashMap<String, MemoryRecord>>,
}

impl VolatileMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `collection`, or 0 if it does not exist.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn strip_embedding(mut record: MemoryRecord, with_embedding: bool) -> MemoryRecord {
    if !with_embedding {
        record.embedding = Vec::new();
    }
    record
}

impl MemoryStore for VolatileMemoryStore {
    fn name(&self) -> &str {
        "volatile"
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        self.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        Ok(self.collections.contains_key(collection))
    }

    async fn upsert(&self, collection: &str, record: &MemoryRecord) -> Result<String, RepositoryError> {
        let entries = self
            .collections
            .get(collection)
            .ok_or_else(|| RepositoryError::InvalidCollection(collection.to_string()))?;
        entries.insert(record.key.clone(), record.clone());
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(key).map(|r| r.clone()))
            .map(|r| strip_embedding(r, with_embedding)))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        if let Some(entries) = self.collections.get(collection) {
            entries.remove(key);
        }
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
        let Some(entries) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<MemoryQueryResult> = entries
            .iter()
            .filter_map(|entry| {
                let record = entry.value();
                let relevance = cosine_similarity(embedding, &record.embedding);
                (relevance >= min_relevance).then(|| MemoryQueryResult {
                    metadata: record.metadata.clone(),
                    relevance,
                    embedding: with_embeddings.then(|| record.embedding.clone()),
                })
            })
            .collect();

        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, embedding: Vec<f32>) -> MemoryRecord {
        MemoryRecord::reference_record(key, "farmprediction", "desc", &format!("text {key}"), embedding)
    }

    #[tokio::test]
    async fn test_upsert_requires_collection() {
        let store = VolatileMemoryStore::new();
        let err = store.upsert("FarmData", &record("0", vec![1.0])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidCollection(_)));
    }

    #[tokio::test]
    async fn test_upsert_same_key_overwrites() {
        let store = VolatileMemoryStore::new();
        store.create_collection("FarmData").await.unwrap();
        store.create_collection("FarmData").await.unwrap();
        store.upsert("FarmData", &record("0", vec![1.0, 0.0])).await.unwrap();
        store.upsert("FarmData", &record("0", vec![0.0, 1.0])).await.unwrap();
        assert_eq!(store.len("FarmData"), 1);

        let fetched = store.get("FarmData", "0", true).await.unwrap().unwrap();
        assert_eq!(fetched.embedding, vec![0.0, 1.0]);
        let stripped = store.get("FarmData", "0", false).await.unwrap().unwrap();
        assert!(stripped.embedding.is_empty());
    }

    #[tokio::test]
    async fn test_nearest_matches_ordered_and_filtered() {
        let store = VolatileMemoryStore::new();
        store.create_collection("c").await.unwrap();
        store.upsert("c", &record("exact", vec![1.0, 0.0])).await.unwrap();
        store.upsert("c", &record("close", vec![0.9, 0.1])).await.unwrap();
        store.upsert("c", &record("far", vec![0.0, 1.0])).await.unwrap();

        let results = store
            .get_nearest_matches("c", &[1.0, 0.0], 5, 0.5, false)
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.metadata.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "close"]);
        assert!(results[0].embedding.is_none());

        let limited = store
            .get_nearest_matches("c", &[1.0, 0.0], 1, 0.0, true)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].embedding.as_deref(), Some(&[1.0, 0.0][..]));
    }

    #[tokio::test]
    async fn test_remove_and_missing_collection() {
        let store = VolatileMemoryStore::new();
        assert!(!store.does_collection_exist("c").await.unwrap());
        assert!(store.get_nearest_matches("c", &[1.0], 3, 0.0, false).await.unwrap().is_empty());
        store.remove("c", "0").await.unwrap();

        store.create_collection("c").await.unwrap();
        store.upsert("c", &record("0", vec![1.0])).await.unwrap();
        store.remove("c", "0").await.unwrap();
        assert!(store.is_empty("c"));
        assert!(store.get("c", "0", false).await.unwrap().is_none());
    }
}
