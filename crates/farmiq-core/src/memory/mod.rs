//! Vector memory for FarmIQ.
//!
//! `MemoryStore` is the storage port implemented per backend in
//! farmiq-infra; `Embedder` turns text into vectors; `SemanticTextMemory`
//! combines the two into the text-in, text-out API used by skills and the
//! seed loader.

pub mod box_embedder;
pub mod box_store;
pub mod embedder;
pub mod semantic;
pub mod store;

pub use box_embedder::BoxEmbedder;
pub use box_store::BoxMemoryStore;
pub use embedder::Embedder;
pub use semantic::SemanticTextMemory;
pub use store::MemoryStore;
