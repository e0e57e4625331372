//! Vector memory store trait.
//!
//! Defines the collection-scoped interface every vector backend exposes.
//! Implementations (volatile, Qdrant, Azure Cognitive Search, Chroma,
//! Postgres) live in farmiq-infra.

use farmiq_types::error::RepositoryError;
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord};

/// Trait for collection-scoped vector storage with similarity search.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait MemoryStore: Send + Sync {
    /// Backend name for logging and health output.
    fn name(&self) -> &str;

    /// Create a collection. Creating an existing collection is not an error.
    fn create_collection(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn does_collection_exist(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert or replace a record under `record.key`. Returns the stored key.
    fn upsert(
        &self,
        collection: &str,
        record: &MemoryRecord,
    ) -> impl std::future::Future<Output = Result<String, RepositoryError>> + Send;

    /// Fetch a record by key. `with_embedding` controls whether the vector is returned.
    fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> impl std::future::Future<Output = Result<Option<MemoryRecord>, RepositoryError>> + Send;

    /// Remove a record by key. Removing a missing key is not an error.
    fn remove(
        &self,
        collection: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Up to `limit` records whose relevance is at least `min_relevance`,
    /// ordered by relevance descending.
    fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryQueryResult>, RepositoryError>> + Send;
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
