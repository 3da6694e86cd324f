pub mod db;
pub mod embeddings;
pub mod insight_llm;
pub mod qa_llm;
pub mod retriever;
pub mod storage;

pub use db::DbAdapter;
pub use embeddings::OpenAiEmbeddingAdapter;
pub use insight_llm::OpenAiInsightAdapter;
pub use qa_llm::OpenAiQaAdapter;
pub use retriever::{FixedOrderRetriever, ScoredRetriever};
pub use storage::StorageAdapter;
