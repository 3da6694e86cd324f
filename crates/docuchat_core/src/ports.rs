//! crates/docuchat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Chunk;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Chunk Store
//=========================================================================================

/// Persistence for chunk rows in the external `document_chunks` table.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Inserts one row per chunk as a single batch statement. Partial
    /// application on failure is a property of the external store, not
    /// something this call recovers from.
    async fn insert_chunks(&self, chunks: &[Chunk]) -> PortResult<()>;

    /// Deletes every row owned by `document_id`, returning the affected count.
    async fn delete_chunks_by_document(&self, document_id: Uuid) -> PortResult<u64>;

    /// Fetches an unranked window of rows in insertion order.
    async fn fetch_chunk_window(&self, limit: i64) -> PortResult<Vec<Chunk>>;

    /// Cheap existence probe used before the chat and insight pipelines run.
    async fn has_chunks(&self) -> PortResult<bool>;

    /// Idempotently creates the chunk table and its document-id index.
    async fn ensure_schema(&self) -> PortResult<()>;
}

//=========================================================================================
// Document Storage (object bucket)
//=========================================================================================

/// A single object as reported by the storage bucket listing.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// The storage service's own object id.
    pub id: String,
    /// Object key within the bucket.
    pub name: String,
    pub media_type: Option<String>,
    pub size: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of an idempotent bucket-creation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Created,
    AlreadyExists,
}

/// The external managed object store holding raw document bytes.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Creates the documents bucket; an already-existing bucket is success.
    async fn create_bucket(&self) -> PortResult<BucketStatus>;

    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> PortResult<()>;

    async fn list(&self) -> PortResult<Vec<StoredObject>>;

    async fn remove(&self, path: &str) -> PortResult<()>;

    /// Public download URL for an object key. Pure string construction.
    fn public_url(&self, path: &str) -> String;
}

//=========================================================================================
// Hosted Model Services
//=========================================================================================

/// Wraps the hosted embedding API. Ingestion computes document embeddings
/// through this port and discards them; no vector is ever persisted.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>>;
    async fn embed_query(&self, text: &str) -> PortResult<Vec<f32>>;
}

/// Why an answer is being generated without retrieved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UngroundedReason {
    /// The user has not uploaded any documents yet.
    NoDocuments,
    /// Retrieval failed and the handler fell back to a direct answer.
    RetrievalFailed,
}

/// Formats a question (and optionally retrieved context) into a prompt and
/// forwards it to the hosted language model.
#[async_trait]
pub trait AnswerGenerationService: Send + Sync {
    /// Answers a question grounded in the provided context string.
    async fn answer(&self, question: &str, context: &str) -> PortResult<String>;

    /// Answers directly from the model, with a preamble matching `reason`.
    async fn answer_ungrounded(&self, question: &str, reason: UngroundedReason)
        -> PortResult<String>;
}

/// Generates the canned analytics report over the uploaded corpus.
#[async_trait]
pub trait InsightService: Send + Sync {
    async fn generate(&self, context: &str) -> PortResult<String>;
}

//=========================================================================================
// Retrieval
//=========================================================================================

/// Per-candidate score detail, returned when a caller asks for debug output.
#[derive(Debug, Clone)]
pub struct SimilarityScore {
    pub document_id: Uuid,
    /// The chunk row id, `"{document_id}-chunk-{index}"`.
    pub chunk_id: String,
    pub score: f32,
    /// Truncated content preview.
    pub content: String,
}

/// The outcome of one retrieval call: the chunks to feed the model, plus the
/// full score list when debug output was requested.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub chunks: Vec<Chunk>,
    pub scores: Option<Vec<SimilarityScore>>,
}

/// A retrieval strategy over the chunk store.
///
/// Concrete strategies (fixed-order, scored) are selected by configuration;
/// a true vector-similarity strategy would implement this same trait.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Fetches a bounded, ordered candidate set for `query`. With `debug`
    /// set, strategies that score candidates also return the full per-item
    /// score list.
    async fn fetch_candidates(&self, query: &str, debug: bool) -> PortResult<Retrieval>;
}
