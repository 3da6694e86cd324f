//! services/api/src/adapters/retriever.rs
//!
//! Concrete retrieval strategies implementing the `Retriever` port.
//!
//! Neither strategy performs semantic search: `ScoredRetriever` reproduces
//! the placeholder behavior of assigning pseudo-random similarity scores to
//! an unranked window of rows, and `FixedOrderRetriever` simply returns rows
//! in insertion order. A real vector-similarity strategy would be a third
//! implementation of the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use docuchat_core::domain::Chunk;
use docuchat_core::ports::{
    ChunkStore, EmbeddingService, PortResult, Retrieval, Retriever, SimilarityScore,
};
use rand::Rng;
use tracing::{debug, warn};

/// How many rows the scored strategy pulls from the store.
const SCORED_WINDOW: i64 = 10;
/// How many of the scored rows are returned to the caller.
const SCORED_TOP_K: usize = 5;
/// Placeholder similarity scores are drawn uniformly from this range.
const SCORE_RANGE: std::ops::Range<f32> = 0.5..0.95;
/// How many rows the fixed-order strategy returns.
const FIXED_LIMIT: i64 = 5;
/// Debug previews are truncated to this many characters.
const PREVIEW_CHARS: usize = 100;

fn preview(content: &str) -> String {
    let mut text: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        text.push_str("...");
    }
    text
}

//=========================================================================================
// Scored Strategy
//=========================================================================================

/// Fetches a fixed window of chunk rows, assigns each a pseudo-random score,
/// and returns the highest-scored rows.
///
/// The query embedding is computed purely as a logged side effect; it never
/// influences ranking, and an embedding failure never fails retrieval.
pub struct ScoredRetriever {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn EmbeddingService>,
}

impl ScoredRetriever {
    /// Creates a new `ScoredRetriever`.
    pub fn new(store: Arc<dyn ChunkStore>, embedder: Arc<dyn EmbeddingService>) -> Self {
        Self { store, embedder }
    }
}

#[async_trait]
impl Retriever for ScoredRetriever {
    async fn fetch_candidates(&self, query: &str, debug: bool) -> PortResult<Retrieval> {
        let window = self.store.fetch_chunk_window(SCORED_WINDOW).await?;

        // Side effect only: the vector is logged and dropped.
        match self.embedder.embed_query(query).await {
            Ok(vector) => debug!(
                dimensions = vector.len(),
                "computed query embedding (unused for ranking)"
            ),
            Err(e) => warn!("query embedding failed, continuing without it: {}", e),
        }

        let mut rng = rand::rng();
        let mut scored: Vec<(Chunk, f32)> = window
            .into_iter()
            .map(|chunk| {
                let score = rng.random_range(SCORE_RANGE);
                (chunk, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let scores = debug.then(|| {
            scored
                .iter()
                .map(|(chunk, score)| SimilarityScore {
                    document_id: chunk.document_id,
                    chunk_id: chunk.id.clone(),
                    score: *score,
                    content: preview(&chunk.content),
                })
                .collect()
        });

        let chunks = scored
            .into_iter()
            .take(SCORED_TOP_K)
            .map(|(mut chunk, score)| {
                chunk.metadata.score = Some(score);
                chunk
            })
            .collect();

        Ok(Retrieval { chunks, scores })
    }
}

//=========================================================================================
// Fixed-Order Strategy
//=========================================================================================

/// Returns the first rows of the chunk table in insertion order, unscored.
/// Also used by the insights pipeline, which passes an empty query.
pub struct FixedOrderRetriever {
    store: Arc<dyn ChunkStore>,
}

impl FixedOrderRetriever {
    /// Creates a new `FixedOrderRetriever`.
    pub fn new(store: Arc<dyn ChunkStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Retriever for FixedOrderRetriever {
    async fn fetch_candidates(&self, _query: &str, _debug: bool) -> PortResult<Retrieval> {
        let chunks = self.store.fetch_chunk_window(FIXED_LIMIT).await?;
        Ok(Retrieval {
            chunks,
            scores: None,
        })
    }
}
