//! Vector memory record types for FarmIQ.
//!
//! These types describe what a memory store persists: a keyed record with
//! text metadata and an embedding, and the scored result of a similarity
//! query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text and provenance attached to a stored embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecordMetadata {
    /// True when the record references an external source rather than
    /// holding information authored in-process.
    pub is_reference: bool,
    pub external_source_name: String,
    pub id: String,
    pub description: String,
    pub text: String,
    #[serde(default)]
    pub additional_metadata: String,
}

/// A record as persisted by a memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store key. Equal to `metadata.id` for records written by semantic memory.
    pub key: String,
    pub metadata: MemoryRecordMetadata,
    pub embedding: Vec<f32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// Build a record referencing an external source, keyed by its external id.
    pub fn reference_record(
        external_id: &str,
        source_name: &str,
        description: &str,
        text: &str,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            key: external_id.to_string(),
            metadata: MemoryRecordMetadata {
                is_reference: true,
                external_source_name: source_name.to_string(),
                id: external_id.to_string(),
                description: description.to_string(),
                text: text.to_string(),
                additional_metadata: String::new(),
            },
            embedding,
            timestamp: Some(Utc::now()),
        }
    }

    /// Build a record holding locally authored information.
    pub fn local_record(id: &str, text: &str, description: &str, embedding: Vec<f32>) -> Self {
        Self {
            key: id.to_string(),
            metadata: MemoryRecordMetadata {
                is_reference: false,
                external_source_name: String::new(),
                id: id.to_string(),
                description: description.to_string(),
                text: text.to_string(),
                additional_metadata: String::new(),
            },
            embedding,
            timestamp: Some(Utc::now()),
        }
    }
}

/// One hit from a similarity query, ordered by `relevance` descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQueryResult {
    pub metadata: MemoryRecordMetadata,
    /// Cosine similarity in [-1, 1]; higher is closer.
    pub relevance: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}
