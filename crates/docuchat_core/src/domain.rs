//! crates/docuchat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework; the
//! serde attributes only pin the wire/JSON field names the service exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a document uploaded by a user and stored in the object bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    /// Declared media type of the uploaded bytes (e.g. `text/plain`).
    #[serde(rename = "type")]
    pub media_type: String,
    pub size: i64,
    /// Object key inside the storage bucket, `"{id}-{name}"`.
    pub path: String,
    pub created_at: DateTime<Utc>,
    /// Public download URL, present once the object is stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The identifying context a chunk batch is derived from.
///
/// Carries just the fields of a [`Document`] that end up in chunk metadata,
/// so ingestion does not need the full record.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub path: String,
}

impl DocumentRef {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            media_type: doc.media_type.clone(),
            path: doc.path.clone(),
        }
    }
}

/// A bounded segment of a document's extracted text, stored and retrieved
/// independently of its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Derived as `"{document_id}-chunk-{index}"`.
    pub id: String,
    pub document_id: Uuid,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub created_at: DateTime<Utc>,
}

/// Per-chunk metadata persisted as JSON alongside the chunk text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub doc_id: Uuid,
    pub doc_name: String,
    /// Storage path of the originating document.
    pub source: String,
    /// Index of this chunk within its document.
    pub chunk_id: usize,
    /// Number of chunks the document was split into.
    pub chunk_total: usize,
    /// Similarity score assigned at retrieval time, absent at rest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Chunk {
    /// Derives the stable chunk id for a document/index pair.
    pub fn derive_id(document_id: Uuid, index: usize) -> String {
        format!("{}-chunk-{}", document_id, index)
    }

    /// Builds the full chunk batch for one document from its chunk texts.
    ///
    /// Ids and metadata are derived here so every caller agrees on the
    /// `"{document_id}-chunk-{index}"` scheme the chunk table relies on.
    pub fn batch(texts: Vec<String>, doc: &DocumentRef) -> Vec<Chunk> {
        let total = texts.len();
        let now = Utc::now();
        texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk {
                id: Chunk::derive_id(doc.id, index),
                document_id: doc.id,
                content,
                metadata: ChunkMetadata {
                    doc_id: doc.id,
                    doc_name: doc.name.clone(),
                    source: doc.path.clone(),
                    chunk_id: index,
                    chunk_total: total,
                    score: None,
                },
                created_at: now,
            })
            .collect()
    }
}

/// Joins retrieved chunk contents into the context string handed to the
/// language model, separated by blank lines.
pub fn format_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A generated analytics report over the uploaded corpus. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: Uuid,
    /// `"all"` — insights are generated over every document at once.
    pub document_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The author of a single chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
    Assistant,
}

/// One message inside a client-side chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Client-side conversational state: an ordered message transcript.
///
/// The server never persists chats; `/chat` receives the chat id opaquely.
/// This model exists so state lives in one explicit object updated through
/// `push`, rather than ad-hoc mutation spread across a UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a message and advances the update timestamp.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.created_at.max(self.updated_at);
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_ref() -> DocumentRef {
        let id = Uuid::new_v4();
        DocumentRef {
            id,
            name: "report.txt".to_string(),
            media_type: "text/plain".to_string(),
            path: format!("{}-report.txt", id),
        }
    }

    #[test]
    fn batch_derives_ids_and_metadata() {
        let doc = doc_ref();
        let chunks = Chunk::batch(vec!["alpha".to_string(), "beta".to_string()], &doc);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, format!("{}-chunk-0", doc.id));
        assert_eq!(chunks[1].id, format!("{}-chunk-1", doc.id));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.document_id, doc.id);
            assert_eq!(chunk.metadata.chunk_id, i);
            assert_eq!(chunk.metadata.chunk_total, 2);
            assert_eq!(chunk.metadata.doc_name, "report.txt");
            assert_eq!(chunk.metadata.source, doc.path);
            assert!(chunk.metadata.score.is_none());
        }
    }

    #[test]
    fn metadata_serializes_camel_case_without_score() {
        let doc = doc_ref();
        let chunk = Chunk::batch(vec!["alpha".to_string()], &doc).remove(0);
        let json = serde_json::to_value(&chunk.metadata).unwrap();

        assert_eq!(json["docName"], "report.txt");
        assert_eq!(json["chunkId"], 0);
        assert_eq!(json["chunkTotal"], 1);
        assert!(json.get("score").is_none());
    }

    #[test]
    fn format_context_joins_with_blank_lines() {
        let doc = doc_ref();
        let chunks = Chunk::batch(vec!["one".to_string(), "two".to_string()], &doc);
        assert_eq!(format_context(&chunks), "one\n\ntwo");
    }

    #[test]
    fn chat_push_advances_updated_at() {
        let mut chat = Chat::new("New chat");
        let before = chat.updated_at;
        chat.push(ChatMessage::new(MessageRole::User, "hello"));
        chat.push(ChatMessage::new(MessageRole::Assistant, "hi"));

        assert_eq!(chat.messages.len(), 2);
        assert!(chat.updated_at >= before);
        assert_eq!(chat.messages[0].role, MessageRole::User);
    }
}
