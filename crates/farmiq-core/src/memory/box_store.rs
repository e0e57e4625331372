//! BoxMemoryStore -- object-safe dynamic dispatch wrapper for MemoryStore.
//!
//! 1. Define an object-safe `MemoryStoreDyn` trait with boxed futures
//! 2. Blanket-impl `MemoryStoreDyn` for all `T: MemoryStore`
//! 3. `BoxMemoryStore` wraps `Box<dyn MemoryStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use farmiq_types::error::RepositoryError;
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord};

use super::store::MemoryStore;

/// Object-safe version of [`MemoryStore`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn MemoryStoreDyn`).
pub trait MemoryStoreDyn: Send + Sync {
    fn name_dyn(&self) -> &str;

    fn create_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn does_collection_exist_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RepositoryError>> + Send + 'a>>;

    fn upsert_boxed<'a>(
        &'a self,
        collection: &'a str,
        record: &'a MemoryRecord,
    ) -> Pin<Box<dyn Future<Output = Result<String, RepositoryError>> + Send + 'a>>;

    fn get_boxed<'a>(
        &'a self,
        collection: &'a str,
        key: &'a str,
        with_embedding: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Option<MemoryRecord>, RepositoryError>> + Send + 'a>>;

    fn remove_boxed<'a>(
        &'a self,
        collection: &'a str,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn get_nearest_matches_boxed<'a>(
        &'a self,
        collection: &'a str,
        embedding: &'a [f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Pin<
        Box<dyn Future<Output = Result<Vec<MemoryQueryResult>, RepositoryError>> + Send + 'a>,
    >;
}

/// Blanket implementation: any `MemoryStore` automatically implements `MemoryStoreDyn`.
impl<T: MemoryStore> MemoryStoreDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn create_collection_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.create_collection(collection))
    }

    fn does_collection_exist_boxed<'a>(
        &'a self,
        collection: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool, RepositoryError>> + Send + 'a>> {
        Box::pin(self.does_collection_exist(collection))
    }

    fn upsert_boxed<'a>(
        &'a self,
        collection: &'a str,
        record: &'a MemoryRecord,
    ) -> Pin<Box<dyn Future<Output = Result<String, RepositoryError>> + Send + 'a>> {
        Box::pin(self.upsert(collection, record))
    }

    fn get_boxed<'a>(
        &'a self,
        collection: &'a str,
        key: &'a str,
        with_embedding: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Option<MemoryRecord>, RepositoryError>> + Send + 'a>>
    {
        Box::pin(self.get(collection, key, with_embedding))
    }

    fn remove_boxed<'a>(
        &'a self,
        collection: &'a str,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.remove(collection, key))
    }

    fn get_nearest_matches_boxed<'a>(
        &'a self,
        collection: &'a str,
        embedding: &'a [f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Pin<
        Box<dyn Future<Output = Result<Vec<MemoryQueryResult>, RepositoryError>> + Send + 'a>,
    > {
        Box::pin(self.get_nearest_matches(
            collection,
            embedding,
            limit,
            min_relevance,
            with_embeddings,
        ))
    }
}

/// Type-erased memory store for runtime backend selection.
///
/// Since `MemoryStore` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxMemoryStore` provides equivalent methods that delegate to
/// the inner `MemoryStoreDyn` trait object.
pub struct BoxMemoryStore {
    inner: Box<dyn MemoryStoreDyn + Send + Sync>,
}

impl BoxMemoryStore {
    /// Wrap a concrete `MemoryStore` in a type-erased box.
    pub fn new<T: MemoryStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    pub async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        self.inner.create_collection_boxed(collection).await
    }

    pub async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        self.inner.does_collection_exist_boxed(collection).await
    }

    pub async fn upsert(
        &self,
        collection: &str,
        record: &MemoryRecord,
    ) -> Result<String, RepositoryError> {
        self.inner.upsert_boxed(collection, record).await
    }

    pub async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        self.inner.get_boxed(collection, key, with_embedding).await
    }

    pub async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        self.inner.remove_boxed(collection, key).await
    }

    pub async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        self.inner
            .get_nearest_matches_boxed(collection, embedding, limit, min_relevance, with_embeddings)
            .await
    }
}
