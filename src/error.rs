//! Error Handling Infrastructure
//!
//! This module defines the error type used throughout asksql.
//! All errors are structured and map to stable error codes.
//!
//! # Error Categories
//! - `ConnectionFailed`: Database unreachable (fatal only at startup)
//! - `QueryFailed`: Query execution errors (rendered as answers, never raised to the loop)
//! - `CompletionFailed`: Text-generation backend faults (retried by the completion client)
//! - `InvalidInput`: Malformed input or out-of-range settings
//! - `EngineError`: Engine-specific database errors
//! - `ConfigError`: Missing or unusable process configuration
//!
//! Query rejections by the read-only validator are not errors of this type;
//! see [`crate::capability::RejectionReason`].

use thiserror::Error;

/// Main error type for asksql operations
#[derive(Error, Debug)]
pub enum AskSqlError {
    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Text-generation backend call failed
    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    /// Invalid input or out-of-range parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Engine-specific database error
    #[error("Engine error ({engine}): {detail}")]
    EngineError { engine: String, detail: String },

    /// Configuration error (missing credential, etc.)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AskSqlError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::CompletionFailed(_) => "COMPLETION_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EngineError { .. } => "ENGINE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Human-readable error message
    ///
    /// Never contains credentials.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a completion failed error
    pub fn completion_failed(message: impl Into<String>) -> Self {
        Self::CompletionFailed(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an engine-specific error
    pub fn engine_error(engine: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::EngineError { engine: engine.into(), detail: detail.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

/// Result type alias for asksql operations
pub type Result<T> = std::result::Result<T, AskSqlError>;
