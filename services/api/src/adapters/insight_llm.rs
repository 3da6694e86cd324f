//! services/api/src/adapters/insight_llm.rs
//!
//! This module contains the adapter for the insight-generating LLM.
//! It implements the `InsightService` port from the `core` crate.

const INSIGHT_PROMPT_TEMPLATE: &str = r#"
You are an insights analyst looking at documents provided by a user.
Documents:
{context}

Based on these documents, provide the following insights:
1. Key themes and topics
2. Main entities mentioned
3. Potential action items
4. A brief summary

Format your response as simple markdown with headers for each section.
"#;

/// Returned when the model produces an empty completion.
const NO_RESPONSE: &str = "No response generated.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use docuchat_core::ports::{InsightService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsightAdapter {
    /// Creates a new `OpenAiInsightAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `InsightService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightService for OpenAiInsightAdapter {
    /// Generates the canned analytics report over the provided context.
    async fn generate(&self, context: &str) -> PortResult<String> {
        let prompt = INSIGHT_PROMPT_TEMPLATE.replace("{context}", context);

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
