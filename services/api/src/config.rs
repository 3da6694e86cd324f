//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which retrieval strategy the chat pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    /// Randomly scored window, sorted and capped (the default).
    Scored,
    /// Plain insertion-order rows, no scores.
    Fixed,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub storage_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub retrieval_strategy: RetrievalStrategy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Storage Settings ---
        let storage_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_URL".to_string()))?;
        let storage_service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_SERVICE_KEY".to_string()))?;
        let storage_bucket =
            std::env::var("DOCUMENTS_BUCKET").unwrap_or_else(|_| "documents".to_string());

        // --- Load API Keys (as optional) ---
        // The model adapters require the key at construction time; startup
        // fails there rather than here so `openapi` generation stays keyless.
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let embedding_model = std::env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let strategy_str =
            std::env::var("RETRIEVAL_STRATEGY").unwrap_or_else(|_| "scored".to_string());
        let retrieval_strategy = match strategy_str.to_lowercase().as_str() {
            "scored" => RetrievalStrategy::Scored,
            "fixed" => RetrievalStrategy::Fixed,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RETRIEVAL_STRATEGY".to_string(),
                    format!("'{}' is not one of: scored, fixed", other),
                ))
            }
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            storage_url,
            storage_service_key,
            storage_bucket,
            openai_api_key,
            chat_model,
            embedding_model,
            retrieval_strategy,
        })
    }
}
