//! Application error types
//!
//! Unified error handling for the binary edge of the data layer.

use datalink_core::PoolError;
use std::fmt;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] TracingError),

    // Pool errors
    #[error(transparent)]
    Pool(#[from] PoolError),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Redis errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get a stable error code for logs and reports
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Logging(_) => "LOGGING_ERROR",
            Self::Pool(e) if e.is_programmer_error() => "POOL_NOT_INITIALIZED",
            Self::Pool(_) => "POOL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure came from an external backend rather than the caller
    #[must_use]
    pub fn is_backend_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Cache(_) => true,
            Self::Pool(e) => !e.is_programmer_error(),
            _ => false,
        }
    }

    /// Create a database error
    #[must_use]
    pub fn database(msg: impl fmt::Display) -> Self {
        Self::Database(msg.to_string())
    }

    /// Create a cache error
    #[must_use]
    pub fn cache(msg: impl fmt::Display) -> Self {
        Self::Cache(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
