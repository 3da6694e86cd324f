//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use crate::ingest;
use crate::web::protocol::{
    ChatRequest, ChatResponse, DebugInfo, DeleteResponse, ProcessStep, RetrievedDocumentDebug,
    ScoreDebug, SetupResponse, Timing,
};
use crate::web::state::AppState;
use docuchat_core::domain::{format_context, Document, DocumentRef, Insight};
use docuchat_core::ports::{StoredObject, UngroundedReason};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        list_documents_handler,
        upload_document_handler,
        delete_document_handler,
        insights_handler,
        setup_handler,
    ),
    components(
        schemas(
            ChatRequest,
            ChatResponse,
            DebugInfo,
            RetrievedDocumentDebug,
            ScoreDebug,
            Timing,
            ProcessStep,
            DeleteResponse,
            SetupResponse,
        )
    ),
    tags(
        (name = "DocuChat API", description = "API endpoints for the RAG document chat demo.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Elapsed milliseconds since `start`.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Truncated content preview for debug payloads.
fn preview(content: &str) -> String {
    let mut text: String = content.chars().take(100).collect();
    if content.chars().count() > 100 {
        text.push_str("...");
    }
    text
}

/// Recovers the document id for a stored object.
///
/// Upload names objects `"{document_id}-{file_name}"`, so the id is parsed
/// back from the key prefix; objects that predate that scheme fall back to
/// the storage service's own object id.
fn document_id_for(object: &StoredObject) -> Option<Uuid> {
    let from_name = object
        .name
        .get(..36)
        .filter(|_| object.name.as_bytes().get(36) == Some(&b'-'))
        .and_then(|prefix| Uuid::parse_str(prefix).ok());
    from_name.or_else(|| Uuid::parse_str(&object.id).ok())
}

/// The display name of a stored object: the key with its id prefix removed,
/// when one is present.
fn display_name(object: &StoredObject) -> String {
    object
        .name
        .get(37..)
        .filter(|_| {
            object.name.get(..36).is_some_and(|prefix| {
                Uuid::parse_str(prefix).is_ok() && object.name.as_bytes().get(36) == Some(&b'-')
            })
        })
        .map(str::to_string)
        .unwrap_or_else(|| object.name.clone())
}

//=========================================================================================
// Chat
//=========================================================================================

/// Answer a question over the uploaded documents.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Generated answer with debug diagnostics", body = ChatResponse),
        (status = 400, description = "Message is missing or empty"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let overall_timer = Instant::now();

    let message = payload
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;
    debug!(chat_id = payload.chat_id.as_deref(), "chat request received");

    let mut debug_info = DebugInfo::begin();
    debug_info.has_documents = app_state.chunks.has_chunks().await?;

    let response = if debug_info.has_documents {
        debug_info.step(
            "documents_found",
            "Found documents in database, proceeding with RAG",
        );
        match rag_answer(&app_state, &message, &mut debug_info).await {
            Ok(answer) => answer,
            Err(e) => {
                // The RAG path failing is not fatal; fall back to a direct answer.
                error!("RAG pipeline failed, falling back to direct answer: {}", e);
                debug_info.step("error", format!("Error in RAG process: {}", e));

                let llm_timer = Instant::now();
                let answer = app_state
                    .qa
                    .answer_ungrounded(&message, UngroundedReason::RetrievalFailed)
                    .await?;
                debug_info.timing.llm_processing = elapsed_ms(llm_timer);
                answer
            }
        }
    } else {
        debug_info.step(
            "no_documents",
            "No documents found in database, using direct LLM",
        );
        let llm_timer = Instant::now();
        let answer = app_state
            .qa
            .answer_ungrounded(&message, UngroundedReason::NoDocuments)
            .await?;
        debug_info.timing.llm_processing = elapsed_ms(llm_timer);
        debug_info.step(
            "response_generated",
            format!(
                "Generated response using direct LLM (no documents) in {:.0}ms",
                debug_info.timing.llm_processing
            ),
        );
        answer
    };

    debug_info.timing.total = elapsed_ms(overall_timer);
    Ok(Json(ChatResponse {
        response,
        debug: Some(debug_info),
    }))
}

/// The retrieval-augmented path of `chat_handler`: retrieve candidates,
/// record diagnostics, and answer grounded in the formatted context.
async fn rag_answer(
    app_state: &AppState,
    message: &str,
    debug_info: &mut DebugInfo,
) -> Result<String, ApiError> {
    let retrieval_timer = Instant::now();
    let retrieval = app_state.retriever.fetch_candidates(message, true).await?;
    debug_info.timing.retrieval = elapsed_ms(retrieval_timer);

    debug_info.retrieved_documents = Some(
        retrieval
            .chunks
            .iter()
            .map(|chunk| RetrievedDocumentDebug {
                id: chunk.document_id,
                name: chunk.metadata.doc_name.clone(),
                chunk_id: chunk.metadata.chunk_id,
                content: preview(&chunk.content),
            })
            .collect(),
    );
    debug_info.similarity_scores = retrieval
        .scores
        .map(|scores| scores.into_iter().map(ScoreDebug::from).collect());
    debug_info.step(
        "documents_retrieved",
        format!(
            "Retrieved {} relevant document chunks in {:.0}ms",
            retrieval.chunks.len(),
            debug_info.timing.retrieval
        ),
    );

    debug_info.step("llm_processing", "Processing with LLM using RAG");
    let llm_timer = Instant::now();
    let context = format_context(&retrieval.chunks);
    let answer = app_state.qa.answer(message, &context).await?;
    debug_info.timing.llm_processing = elapsed_ms(llm_timer);
    debug_info.step(
        "response_generated",
        format!(
            "Generated response using retrieved documents in {:.0}ms",
            debug_info.timing.llm_processing
        ),
    );

    Ok(answer)
}

//=========================================================================================
// Documents
//=========================================================================================

/// List all uploaded documents with their public URLs.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "All stored documents"),
        (status = 500, description = "Storage listing failed")
    )
)]
pub async fn list_documents_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let objects = app_state.storage.list().await?;

    let documents = objects
        .into_iter()
        .filter_map(|object| {
            let Some(id) = document_id_for(&object) else {
                warn!(object = %object.name, "skipping storage object with no recoverable id");
                return None;
            };
            Some(Document {
                id,
                name: display_name(&object),
                media_type: object
                    .media_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                size: object.size.unwrap_or(0),
                url: Some(app_state.storage.public_url(&object.name)),
                path: object.name,
                created_at: object.created_at.unwrap_or_else(Utc::now),
            })
        })
        .collect();

    Ok(Json(documents))
}

/// Upload a document and ingest it for retrieval.
///
/// Accepts a multipart/form-data request with a single `file` part. The
/// document record is returned even when chunk ingestion fails; that failure
/// is only logged (the file itself was stored).
#[utoipa::path(
    post,
    path = "/documents/upload",
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 200, description = "Document stored"),
        (status = 400, description = "No file part provided"),
        (status = 500, description = "Storage upload failed")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Document>, ApiError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("untitled.txt").to_string();
            let media_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
            file = Some((name, media_type, data));
            break;
        }
    }
    let Some((name, media_type, data)) = file else {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    };

    let id = Uuid::new_v4();
    let path = format!("{}-{}", id, name);
    app_state.storage.upload(&path, &data, &media_type).await?;

    let document = Document {
        id,
        name,
        media_type,
        size: data.len() as i64,
        url: Some(app_state.storage.public_url(&path)),
        path,
        created_at: Utc::now(),
    };
    info!(document_id = %document.id, size = document.size, "document stored");

    // The file upload already succeeded; ingestion failure is a soft failure.
    let doc_ref = DocumentRef::from_document(&document);
    if let Err(e) = ingest::process_document(
        app_state.chunks.as_ref(),
        app_state.embedder.as_ref(),
        &data,
        &doc_ref,
    )
    .await
    {
        warn!(
            document_id = %document.id,
            "document was uploaded but chunk processing failed: {}", e
        );
    }

    Ok(Json(document))
}

/// Delete a document and its chunk rows.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "The document id to delete.")),
    responses(
        (status = 200, description = "Document removed", body = DeleteResponse),
        (status = 404, description = "Unknown document id"),
        (status = 500, description = "Storage deletion failed")
    )
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let objects = app_state.storage.list().await?;
    let target = objects
        .into_iter()
        .find(|object| document_id_for(object) == Some(id))
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    app_state.storage.remove(&target.name).await?;

    // The file is already gone; failing here leaves dangling chunk rows with
    // no reconciliation path, so it is logged rather than surfaced.
    match app_state.chunks.delete_chunks_by_document(id).await {
        Ok(deleted) => debug!(document_id = %id, deleted, "chunk rows removed"),
        Err(e) => warn!(
            document_id = %id,
            "document file was deleted but chunk deletion failed: {}", e
        ),
    }

    Ok(Json(DeleteResponse { success: true }))
}

//=========================================================================================
// Insights
//=========================================================================================

/// Generate the canned analytics report over all uploaded documents.
#[utoipa::path(
    get,
    path = "/insights",
    responses(
        (status = 200, description = "Generated insight record"),
        (status = 404, description = "No documents to analyze"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn insights_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Insight>, ApiError> {
    if !app_state.chunks.has_chunks().await? {
        return Err(ApiError::NotFound(
            "No documents found to generate insights".to_string(),
        ));
    }

    // Empty query: the insight pipeline reads the corpus in insertion order.
    let retrieval = app_state
        .insight_retriever
        .fetch_candidates("", false)
        .await?;
    let context = format_context(&retrieval.chunks);
    let content = app_state.insights.generate(&context).await?;

    Ok(Json(Insight {
        id: Uuid::new_v4(),
        document_id: "all".to_string(),
        content,
        created_at: Utc::now(),
    }))
}

//=========================================================================================
// Setup
//=========================================================================================

/// Idempotently bootstrap the chunk table and the storage bucket.
#[utoipa::path(
    post,
    path = "/setup",
    responses(
        (status = 200, description = "Setup succeeded (fully or partially)", body = SetupResponse),
        (status = 500, description = "Bucket creation failed", body = SetupResponse)
    )
)]
pub async fn setup_handler(
    State(app_state): State<Arc<AppState>>,
) -> (StatusCode, Json<SetupResponse>) {
    let table_result = app_state.chunks.ensure_schema().await;
    if let Err(e) = &table_result {
        warn!("table setup failed: {}", e);
    }

    let bucket_result = app_state.storage.create_bucket().await;

    match (table_result, bucket_result) {
        (Ok(()), Ok(status)) => {
            let message = match status {
                docuchat_core::ports::BucketStatus::Created => {
                    "Database and storage initialized successfully"
                }
                docuchat_core::ports::BucketStatus::AlreadyExists => {
                    "Database initialized; storage bucket already exists"
                }
            };
            info!("setup complete: {}", message);
            (StatusCode::OK, Json(SetupResponse::success(message)))
        }
        (Err(table_error), Ok(_)) => (
            StatusCode::OK,
            Json(SetupResponse::partial(table_error.to_string())),
        ),
        (table_result, Err(bucket_error)) => {
            error!("bucket setup failed: {}", bucket_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SetupResponse::failure(
                    table_result.err().map(|e| e.to_string()),
                    bucket_error.to_string(),
                )),
            )
        }
    }
}
