//! services/api/src/adapters/embeddings.rs
//!
//! This module contains the adapter for the hosted embedding API.
//! It implements the `EmbeddingService` port from the `core` crate.
//!
//! The wider system computes embeddings during ingestion and for queries but
//! never persists or searches them; this adapter only wraps the API call.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::embeddings::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use docuchat_core::ports::{EmbeddingService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmbeddingService` using an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    async fn embed(&self, inputs: Vec<String>) -> PortResult<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(inputs)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let mut data = response.data;
        // The API reports an index per vector; order by it rather than
        // trusting response order.
        data.sort_by_key(|embedding| embedding.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

//=========================================================================================
// `EmbeddingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed(texts.to_vec()).await
    }

    async fn embed_query(&self, text: &str) -> PortResult<Vec<f32>> {
        let mut vectors = self.embed(vec![text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            PortError::Unexpected("Embedding API returned no vector for the query.".to_string())
        })
    }
}
