//! services/api/src/web/protocol.rs
//!
//! Defines the JSON request/response payloads of the REST API. Field names
//! follow the wire format the browser client already speaks (camelCase for
//! debug/insight/setup payloads, snake_case on Document records).

use chrono::{DateTime, Utc};
use docuchat_core::ports::SimilarityScore;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Chat
//=========================================================================================

/// The request body of `POST /chat`.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's question. Required; an empty string is rejected.
    pub message: Option<String>,
    /// Client-side chat id, carried opaquely for log correlation only.
    pub chat_id: Option<String>,
}

/// The response body of `POST /chat`.
#[derive(Serialize, Debug, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Per-request diagnostics returned alongside every chat answer.
#[derive(Serialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub has_documents: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_documents: Option<Vec<RetrievedDocumentDebug>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_scores: Option<Vec<ScoreDebug>>,
    pub timing: Timing,
    pub process_steps: Vec<ProcessStep>,
}

impl DebugInfo {
    /// Starts a debug record with the initial query-received step.
    pub fn begin() -> Self {
        let mut info = Self::default();
        info.step("query_received", "Received user query");
        info
    }

    /// Appends a timestamped process step.
    pub fn step(&mut self, step: &str, message: impl Into<String>) {
        self.process_steps.push(ProcessStep {
            step: step.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}

/// One retrieved chunk, as shown in the debug panel.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedDocumentDebug {
    /// Owning document id.
    pub id: Uuid,
    /// Owning document display name.
    pub name: String,
    /// Chunk index within the document.
    pub chunk_id: usize,
    /// Truncated content preview.
    pub content: String,
}

/// One entry of the full score list a debug retrieval returns.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDebug {
    pub document_id: Uuid,
    pub chunk_id: String,
    pub score: f32,
    pub content: String,
}

impl From<SimilarityScore> for ScoreDebug {
    fn from(score: SimilarityScore) -> Self {
        Self {
            document_id: score.document_id,
            chunk_id: score.chunk_id,
            score: score.score,
            content: score.content,
        }
    }
}

/// Wall-clock timings, in milliseconds.
#[derive(Serialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub total: f64,
    pub retrieval: f64,
    pub llm_processing: f64,
}

/// A timestamped milestone of one request's processing.
#[derive(Serialize, Debug, ToSchema)]
pub struct ProcessStep {
    pub step: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Documents
//=========================================================================================

/// The response body of `DELETE /documents/{id}`.
#[derive(Serialize, Debug, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

//=========================================================================================
// Setup
//=========================================================================================

/// The response body of `POST /setup`, covering the success, partial-success
/// and failure shapes.
#[derive(Serialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_setup_instructions: Option<String>,
}

/// Manual-recovery guidance for a failed table bootstrap.
pub const MANUAL_TABLE_INSTRUCTIONS: &str =
    "Run the SQL from sql/schema.sql in your database's SQL editor";
/// Manual-recovery guidance for a failed bucket bootstrap.
pub const MANUAL_BUCKET_INSTRUCTIONS: &str =
    "Create a 'documents' bucket in the storage dashboard";

impl SetupResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn partial(table_error: impl Into<String>) -> Self {
        Self {
            partial_success: Some(true),
            message: Some(
                "Storage bucket is ready, but database setup needs manual intervention"
                    .to_string(),
            ),
            table_error: Some(table_error.into()),
            manual_setup_instructions: Some(MANUAL_TABLE_INSTRUCTIONS.to_string()),
            ..Self::default()
        }
    }

    pub fn failure(table_error: Option<String>, bucket_error: impl Into<String>) -> Self {
        let instructions = if table_error.is_some() {
            format!(
                "1. {}\n2. {}",
                MANUAL_TABLE_INSTRUCTIONS, MANUAL_BUCKET_INSTRUCTIONS
            )
        } else {
            MANUAL_BUCKET_INSTRUCTIONS.to_string()
        };
        Self {
            error: Some(if table_error.is_some() {
                "Failed to create table and bucket".to_string()
            } else {
                "Failed to create bucket".to_string()
            }),
            table_error,
            bucket_details: Some(bucket_error.into()),
            manual_setup_instructions: Some(instructions),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_missing_fields() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_none());
        assert!(request.chat_id.is_none());

        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "hi", "chatId": "abc"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("hi"));
        assert_eq!(request.chat_id.as_deref(), Some("abc"));
    }

    #[test]
    fn debug_info_serializes_camel_case() {
        let mut info = DebugInfo::begin();
        info.has_documents = true;
        info.step("documents_found", "Found documents");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["hasDocuments"], true);
        assert_eq!(json["processSteps"][0]["step"], "query_received");
        assert_eq!(json["timing"]["llmProcessing"], 0.0);
        // Unset optional sections stay off the wire entirely.
        assert!(json.get("retrievedDocuments").is_none());
        assert!(json.get("similarityScores").is_none());
    }

    #[test]
    fn setup_success_omits_failure_fields() {
        let json = serde_json::to_value(SetupResponse::success("ok")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("partialSuccess").is_none());
    }

    #[test]
    fn setup_partial_reports_table_error() {
        let json = serde_json::to_value(SetupResponse::partial("permission denied")).unwrap();
        assert_eq!(json["partialSuccess"], true);
        assert_eq!(json["tableError"], "permission denied");
        assert!(json["manualSetupInstructions"]
            .as_str()
            .unwrap()
            .contains("sql/schema.sql"));
    }

    #[test]
    fn setup_failure_mentions_both_steps_when_both_failed() {
        let json = serde_json::to_value(SetupResponse::failure(
            Some("table down".to_string()),
            "bucket down",
        ))
        .unwrap();
        assert_eq!(json["error"], "Failed to create table and bucket");
        assert_eq!(json["bucketDetails"], "bucket down");
        assert!(json["manualSetupInstructions"]
            .as_str()
            .unwrap()
            .starts_with("1."));
    }
}
