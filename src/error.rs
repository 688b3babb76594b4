//! Error types for Talent Scout.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document ingestion errors.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("File content is not valid base64: {0}")]
    InvalidEncoding(String),

    #[error("Unsupported file format for {file_name}. Only PDF, DOCX, and TXT are supported.")]
    UnsupportedFormat { file_name: String },

    #[error("No text could be extracted from {file_name}")]
    EmptyText { file_name: String },

    #[error("No text extractor is configured for {format} files")]
    ExtractorUnavailable { format: String },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Structured parsing failed: {0}")]
    Llm(#[from] LlmError),
}

/// Conversation state machine errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Technical questions were already generated for this conversation")]
    QuestionsAlreadyGenerated,

    #[error("Generated question set is empty")]
    EmptyQuestionSet,
}
