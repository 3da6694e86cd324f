//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ChunkStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL `document_chunks` table using `sqlx`.
//!
//! Queries are bound at runtime (not compile-time checked macros) because the
//! table is created at run time by the `/setup` endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docuchat_core::domain::{Chunk, ChunkMetadata};
use docuchat_core::ports::{ChunkStore, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ChunkStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ChunkRecord {
    id: String,
    document_id: String,
    content: String,
    metadata: Json<ChunkMetadata>,
    created_at: DateTime<Utc>,
}

impl ChunkRecord {
    fn to_domain(self) -> PortResult<Chunk> {
        let document_id = Uuid::parse_str(&self.document_id).map_err(|e| {
            PortError::Unexpected(format!(
                "Chunk {} has a non-uuid document_id '{}': {}",
                self.id, self.document_id, e
            ))
        })?;
        Ok(Chunk {
            id: self.id,
            document_id,
            content: self.content,
            metadata: self.metadata.0,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `ChunkStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChunkStore for DbAdapter {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> PortResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO document_chunks (id, document_id, content, metadata, created_at) ",
        );
        builder.push_values(chunks, |mut row, chunk| {
            row.push_bind(&chunk.id)
                .push_bind(chunk.document_id.to_string())
                .push_bind(&chunk.content)
                .push_bind(Json(&chunk.metadata))
                .push_bind(chunk.created_at);
        });

        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn delete_chunks_by_document(&self, document_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn fetch_chunk_window(&self, limit: i64) -> PortResult<Vec<Chunk>> {
        let records = sqlx::query_as::<_, ChunkRecord>(
            "SELECT id, document_id, content, metadata, created_at \
             FROM document_chunks ORDER BY created_at ASC, id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(ChunkRecord::to_domain).collect()
    }

    async fn has_chunks(&self) -> PortResult<bool> {
        let row: Option<String> = sqlx::query_scalar("SELECT id FROM document_chunks LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn ensure_schema(&self) -> PortResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS document_chunks (\
                 id TEXT PRIMARY KEY, \
                 document_id TEXT NOT NULL, \
                 content TEXT NOT NULL, \
                 metadata JSONB NOT NULL DEFAULT '{}'::jsonb, \
                 created_at TIMESTAMPTZ DEFAULT now()\
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_document_chunks_document_id \
             ON document_chunks (document_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(())
    }
}
