//! Vector memory backends.
//!
//! One [`MemoryStore`](farmiq_core::memory::MemoryStore) implementation per
//! supported database, plus [`selector::create_memory_store`] which picks
//! exactly one of them from `[memory_store]`.

pub mod azure_search;
pub mod chroma;
pub mod postgres;
pub mod qdrant;
pub mod selector;
pub mod volatile;

pub use azure_search::AzureCognitiveSearchMemoryStore;
pub use chroma::ChromaMemoryStore;
pub use postgres::PostgresMemoryStore;
pub use qdrant::QdrantMemoryStore;
pub use selector::create_memory_store;
pub use volatile::VolatileMemoryStore;

use farmiq_types::error::RepositoryError;

/// Map a transport failure into a repository error.
pub(crate) fn request_failed(backend: &str, e: reqwest::Error) -> RepositoryError {
    RepositoryError::Query(format!("{backend} request failed: {e}"))
}

/// Turn a non-success response into a repository error, keeping the body.
pub(crate) async fn check_status(
    backend: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::Query(format!("{backend} returned {status}: {body}")))
}
