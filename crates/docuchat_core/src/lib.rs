pub mod chunking;
pub mod domain;
pub mod extract;
pub mod ports;

pub use chunking::{chunk_text, ChunkPolicy};
pub use domain::{
    format_context, Chat, ChatMessage, Chunk, ChunkMetadata, Document, DocumentRef, Insight,
    MessageRole,
};
pub use extract::extract_text;
pub use ports::{
    AnswerGenerationService, BucketStatus, ChunkStore, DocumentStorage, EmbeddingService,
    InsightService, PortError, PortResult, Retrieval, Retriever, SimilarityScore, StoredObject,
    UngroundedReason,
};
