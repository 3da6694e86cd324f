//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the Question-Answering LLM.
//! It implements the `AnswerGenerationService` port from the `core` crate.

const QA_PROMPT_TEMPLATE: &str = r#"
You are a helpful assistant that answers questions based on the provided documents.
Documents:
{context}

Question: {question}

Answer the question based only on the provided documents. If the documents don't contain the answer, say "I don't have enough information to answer this question".
Your answer should be thorough, accurate, and helpful.
"#;

const NO_DOCUMENTS_TEMPLATE: &str = r#"You are a helpful AI assistant. User doesn't have any documents uploaded yet.
Answer the following question:
{question}"#;

const RETRIEVAL_FAILED_TEMPLATE: &str = r#"You are a helpful AI assistant. There was an error retrieving documents.
Please answer the following question with general knowledge:
{question}"#;

/// Returned when the model produces an empty completion.
const NO_RESPONSE: &str = "No response generated.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use docuchat_core::ports::{AnswerGenerationService, PortError, PortResult, UngroundedReason};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnswerGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends one fully-rendered prompt to the chat model and returns the
    /// first completion's text, or the fixed no-response string when the
    /// model returns an empty choice list.
    async fn complete(&self, prompt: String) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.1)
            .max_completion_tokens(1024u32)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        Ok(text.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

//=========================================================================================
// `AnswerGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerGenerationService for OpenAiQaAdapter {
    /// Answers a user's question grounded in the retrieved document context.
    async fn answer(&self, question: &str, context: &str) -> PortResult<String> {
        let prompt = QA_PROMPT_TEMPLATE
            .replace("{context}", context)
            .replace("{question}", question);
        self.complete(prompt).await
    }

    /// Answers without document context; the prompt explains why none is
    /// available so the model does not invent citations.
    async fn answer_ungrounded(
        &self,
        question: &str,
        reason: UngroundedReason,
    ) -> PortResult<String> {
        let template = match reason {
            UngroundedReason::NoDocuments => NO_DOCUMENTS_TEMPLATE,
            UngroundedReason::RetrievalFailed => RETRIEVAL_FAILED_TEMPLATE,
        };
        self.complete(template.replace("{question}", question)).await
    }
}
