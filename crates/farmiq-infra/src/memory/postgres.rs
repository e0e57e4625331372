//! Postgres memory store using the pgvector extension.
//!
//! Each collection is a table named after it. Collection names are
//! interpolated into SQL, so they are validated as plain identifiers
//! before any statement is built.

use chrono::{DateTime, Utc};
use farmiq_core::memory::MemoryStore;
use farmiq_types::config::PostgresConfig;
use farmiq_types::error::{ConfigError, RepositoryError};
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord, MemoryRecordMetadata};
use pgvector::Vector;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;

const BACKEND: &str = "postgres";
const MAX_CONNECTIONS: u32 = 5;
const UNDEFINED_TABLE: &str = "42P01";

pub struct PostgresMemoryStore {
    pool: PgPool,
    vector_size: usize,
}

/// Validate `collection` as a Postgres identifier and quote it.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes.
pub fn table_name(collection: &str) -> Result<String, RepositoryError> {
    let mut chars = collection.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest || collection.len() > 63 {
        return Err(RepositoryError::InvalidCollection(collection.to_string()));
    }
    Ok(format!("\"{collection}\""))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn is_undefined_table(e: &sqlx::Error) -> bool {
    is_undefined_table_code(e.as_database_error().and_then(|d| d.code()).as_deref())
}

/// SQLSTATE 42P01: the collection's table was never created.
fn is_undefined_table_code(code: Option<&str>) -> bool {
    code == Some(UNDEFINED_TABLE)
}

fn create_table_sql(table: &str, vector_size: usize) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            key TEXT PRIMARY KEY,
            metadata JSONB NOT NULL,
            embedding vector({vector_size}) NOT NULL,
            timestamp TIMESTAMPTZ
        )"
    )
}

/// Insert or replace by key; re-seeding overwrites instead of duplicating.
fn upsert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} (key, metadata, embedding, timestamp)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (key) DO UPDATE
         SET metadata = EXCLUDED.metadata,
             embedding = EXCLUDED.embedding,
             timestamp = EXCLUDED.timestamp"
    )
}

fn get_sql(table: &str) -> String {
    format!("SELECT key, metadata, embedding, timestamp FROM {table} WHERE key = $1")
}

fn delete_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE key = $1")
}

/// Cosine relevance is `1 - cosine distance`; `$1` query, `$2` floor, `$3` limit.
fn nearest_sql(table: &str) -> String {
    format!(
        "SELECT key, metadata, embedding, timestamp,
                1 - (embedding <=> $1) AS relevance
         FROM {table}
         WHERE 1 - (embedding <=> $1) >= $2
         ORDER BY embedding <=> $1
         LIMIT $3"
    )
}

struct MemoryRow {
    key: String,
    metadata: Json<MemoryRecordMetadata>,
    embedding: Vector,
    timestamp: Option<DateTime<Utc>>,
}

impl MemoryRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            metadata: row.try_get("metadata")?,
            embedding: row.try_get("embedding")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_record(self, with_embedding: bool) -> MemoryRecord {
        MemoryRecord {
            key: self.key,
            metadata: self.metadata.0,
            embedding: if with_embedding { self.embedding.to_vec() } else { Vec::new() },
            timestamp: self.timestamp,
        }
    }
}

impl PostgresMemoryStore {
    /// Build a lazily connected pool; no I/O happens until the first query.
    pub fn new(config: &PostgresConfig) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy(config.connection_string.expose_secret())
            .map_err(|e| ConfigError::InvalidEndpoint {
                value: "memory_store.postgres.connection_string".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_pool(pool, config.vector_size))
    }

    pub fn with_pool(pool: PgPool, vector_size: usize) -> Self {
        Self { pool, vector_size }
    }
}

impl MemoryStore for PostgresMemoryStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        let table = table_name(collection)?;

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        sqlx::query(&create_table_sql(&table, self.vector_size))
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        tracing::info!(collection, vector_size = self.vector_size, "Postgres collection ready");
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        table_name(collection)?;
        let row = sqlx::query(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            ) AS present",
        )
        .bind(collection)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;
        row.try_get("present").map_err(query_error)
    }

    async fn upsert(&self, collection: &str, record: &MemoryRecord) -> Result<String, RepositoryError> {
        let table = table_name(collection)?;
        sqlx::query(&upsert_sql(&table))
            .bind(&record.key)
            .bind(Json(&record.metadata))
            .bind(Vector::from(record.embedding.clone()))
            .bind(record.timestamp)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        let table = table_name(collection)?;
        let row = match sqlx::query(&get_sql(&table)).bind(key).fetch_optional(&self.pool).await {
            Ok(row) => row,
            Err(e) if is_undefined_table(&e) => return Ok(None),
            Err(e) => return Err(query_error(e)),
        };
        row.map(|r| MemoryRow::from_row(&r).map(|m| m.into_record(with_embedding)))
            .transpose()
            .map_err(query_error)
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        let table = table_name(collection)?;
        match sqlx::query(&delete_sql(&table)).bind(key).execute(&self.pool).await {
            Ok(_) => Ok(()),
            Err(e) if is_undefined_table(&e) => Ok(()),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        let table = table_name(collection)?;
        let rows = match sqlx::query(&nearest_sql(&table))
            .bind(Vector::from(embedding.to_vec()))
            .bind(f64::from(min_relevance))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows,
            Err(e) if is_undefined_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(query_error(e)),
        };

        rows.iter()
            .map(|row| {
                let relevance: f64 = row.try_get("relevance")?;
                let record = MemoryRow::from_row(row)?.into_record(with_embeddings);
                Ok(MemoryQueryResult {
                    metadata: record.metadata,
                    relevance: relevance as f32,
                    embedding: with_embeddings.then_some(record.embedding),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(query_error)
    }
}
