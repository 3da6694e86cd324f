//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use docuchat_core::ports::{
    AnswerGenerationService, ChunkStore, DocumentStorage, EmbeddingService, InsightService,
    Retriever,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Everything here is immutable after construction; requests share nothing
/// else in-process, so concurrent requests never coordinate.
#[derive(Clone)]
pub struct AppState {
    pub chunks: Arc<dyn ChunkStore>,
    pub storage: Arc<dyn DocumentStorage>,
    pub embedder: Arc<dyn EmbeddingService>,
    pub qa: Arc<dyn AnswerGenerationService>,
    pub insights: Arc<dyn InsightService>,
    /// The strategy `/chat` retrieves with, selected by configuration.
    pub retriever: Arc<dyn Retriever>,
    /// `/insights` always reads the corpus in insertion order.
    pub insight_retriever: Arc<dyn Retriever>,
    pub config: Arc<Config>,
}
