//! services/api/src/ingest.rs
//!
//! The document-ingestion pipeline: extract text from the uploaded bytes,
//! chunk it, compute (and discard) embeddings, and persist the chunk rows.
//!
//! Ingestion runs after the raw file is already stored; callers treat a
//! failure here as a soft failure — the upload result stands, the warning
//! goes to the log, and no chunk rows exist for the document.

use docuchat_core::chunking::{chunk_text, ChunkPolicy};
use docuchat_core::domain::{Chunk, DocumentRef};
use docuchat_core::extract::extract_text;
use docuchat_core::ports::{ChunkStore, EmbeddingService, PortError, PortResult};
use tracing::{debug, info};

/// Runs the full ingestion pipeline for one uploaded document and returns
/// the number of chunk rows stored.
///
/// Embeddings are computed before the insert, so an embedding failure means
/// no rows are written; the vectors themselves are logged and discarded
/// (nothing in this system searches them).
pub async fn process_document(
    store: &dyn ChunkStore,
    embedder: &dyn EmbeddingService,
    bytes: &[u8],
    doc: &DocumentRef,
) -> PortResult<usize> {
    let text = extract_text(bytes, &doc.media_type);
    if text.trim().is_empty() {
        return Err(PortError::Unexpected(format!(
            "No text extracted from document {}",
            doc.id
        )));
    }

    let texts = chunk_text(&text, &ChunkPolicy::default());
    let chunks = Chunk::batch(texts, doc);
    if chunks.is_empty() {
        return Err(PortError::Unexpected(format!(
            "Document {} produced no chunks",
            doc.id
        )));
    }

    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embedder.embed_documents(&contents).await?;
    debug!(
        document_id = %doc.id,
        vectors = vectors.len(),
        dimensions = vectors.first().map(Vec::len).unwrap_or(0),
        "computed document embeddings (discarded, not persisted)"
    );

    store.insert_chunks(&chunks).await?;
    info!(document_id = %doc.id, chunks = chunks.len(), "stored document chunks");
    Ok(chunks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<Chunk>>,
        fail: bool,
    }

    #[async_trait]
    impl ChunkStore for RecordingStore {
        async fn insert_chunks(&self, chunks: &[Chunk]) -> PortResult<()> {
            if self.fail {
                return Err(PortError::Unexpected("insert failed".to_string()));
            }
            self.inserted.lock().unwrap().extend_from_slice(chunks);
            Ok(())
        }

        async fn delete_chunks_by_document(&self, _document_id: Uuid) -> PortResult<u64> {
            Ok(0)
        }

        async fn fetch_chunk_window(&self, _limit: i64) -> PortResult<Vec<Chunk>> {
            Ok(Vec::new())
        }

        async fn has_chunks(&self) -> PortResult<bool> {
            Ok(!self.inserted.lock().unwrap().is_empty())
        }

        async fn ensure_schema(&self) -> PortResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingEmbedder {
        calls: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingService for RecordingEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>> {
            if self.fail {
                return Err(PortError::Unexpected("embedding api down".to_string()));
            }
            self.calls.lock().unwrap().push(texts.to_vec());
            Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect())
        }

        async fn embed_query(&self, _text: &str) -> PortResult<Vec<f32>> {
            Ok(vec![0.1, 0.2])
        }
    }

    fn doc_ref(media_type: &str) -> DocumentRef {
        let id = Uuid::new_v4();
        DocumentRef {
            id,
            name: "notes.txt".to_string(),
            media_type: media_type.to_string(),
            path: format!("{}-notes.txt", id),
        }
    }

    #[tokio::test]
    async fn pipeline_stores_derived_chunks_and_embeds_once() {
        let store = RecordingStore::default();
        let embedder = RecordingEmbedder::default();
        let doc = doc_ref("text/plain");

        let stored = process_document(&store, &embedder, b"first paragraph\n\nsecond", &doc)
            .await
            .unwrap();

        assert_eq!(stored, 1);
        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].id, format!("{}-chunk-0", doc.id));
        assert_eq!(inserted[0].content, "first paragraph second");
        assert_eq!(inserted[0].metadata.chunk_total, 1);

        let calls = embedder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["first paragraph second".to_string()]);
    }

    #[tokio::test]
    async fn embedding_failure_aborts_before_the_insert() {
        let store = RecordingStore::default();
        let embedder = RecordingEmbedder {
            fail: true,
            ..Default::default()
        };
        let doc = doc_ref("text/plain");

        let result = process_document(&store, &embedder, b"some text", &doc).await;
        assert!(result.is_err());
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_propagates() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let embedder = RecordingEmbedder::default();
        let doc = doc_ref("text/plain");

        let result = process_document(&store, &embedder, b"some text", &doc).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_extraction_is_an_error_and_calls_nothing() {
        let store = RecordingStore::default();
        let embedder = RecordingEmbedder::default();
        let doc = doc_ref("text/plain");

        let result = process_document(&store, &embedder, b"   \n  ", &doc).await;
        assert!(result.is_err());
        assert!(embedder.calls.lock().unwrap().is_empty());
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_media_type_ingests_placeholder_text() {
        let store = RecordingStore::default();
        let embedder = RecordingEmbedder::default();
        let doc = doc_ref("application/pdf");

        let stored = process_document(&store, &embedder, b"%PDF-1.4", &doc)
            .await
            .unwrap();

        assert_eq!(stored, 1);
        let inserted = store.inserted.lock().unwrap();
        assert!(inserted[0].content.contains("application/pdf"));
    }
}
