//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DbAdapter, FixedOrderRetriever, OpenAiEmbeddingAdapter, OpenAiInsightAdapter,
        OpenAiQaAdapter, ScoredRetriever, StorageAdapter,
    },
    adapters::storage::MAX_FILE_SIZE_BYTES,
    config::{Config, RetrievalStrategy},
    error::ApiError,
    web::{
        chat_handler, delete_document_handler, insights_handler, list_documents_handler,
        rest::ApiDoc, setup_handler, state::AppState, upload_document_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use docuchat_core::ports::Retriever;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let storage_adapter = Arc::new(StorageAdapter::new(
        &config.storage_url,
        config.storage_service_key.clone(),
        config.storage_bucket.clone(),
    ));
    let embedding_adapter = Arc::new(OpenAiEmbeddingAdapter::new(
        openai_client.clone(),
        config.embedding_model.clone(),
    ));
    let qa_adapter = Arc::new(OpenAiQaAdapter::new(
        openai_client.clone(),
        config.chat_model.clone(),
    ));
    let insight_adapter = Arc::new(OpenAiInsightAdapter::new(
        openai_client,
        config.chat_model.clone(),
    ));

    let retriever: Arc<dyn Retriever> = match config.retrieval_strategy {
        RetrievalStrategy::Scored => Arc::new(ScoredRetriever::new(
            db_adapter.clone(),
            embedding_adapter.clone(),
        )),
        RetrievalStrategy::Fixed => Arc::new(FixedOrderRetriever::new(db_adapter.clone())),
    };
    let insight_retriever: Arc<dyn Retriever> =
        Arc::new(FixedOrderRetriever::new(db_adapter.clone()));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        chunks: db_adapter,
        storage: storage_adapter,
        embedder: embedding_adapter,
        qa: qa_adapter,
        insights: insight_adapter,
        retriever,
        insight_retriever,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/chat", post(chat_handler))
        .route("/documents", get(list_documents_handler))
        .route("/documents/upload", post(upload_document_handler))
        .route("/documents/{id}", delete(delete_document_handler))
        .route("/insights", get(insights_handler))
        .route("/setup", post(setup_handler))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE_BYTES as usize))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
