//! Pool and retry error types

/// Error returned by a [`Retried`](crate::Retried) operation
///
/// Under the default policy retries never end, so this is only produced
/// when a deadline has been configured.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetryError {
    #[error("Operation '{operation}' gave up after {attempts} attempts: {last_error}")]
    DeadlineExceeded {
        operation: String,
        attempts: u64,
        last_error: String,
    },
}

/// Errors surfaced by pools and the registry
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool was used before `create` completed
    #[error("Connection pool '{0}' is not initialized")]
    NotInitialized(String),

    /// The backend refused or dropped a connection attempt
    #[error("Backend error: {0}")]
    Backend(String),

    /// The pool's permit semaphore was closed
    #[error("Connection pool '{0}' is closed")]
    Closed(String),

    #[error(transparent)]
    Retry(#[from] RetryError),
}

impl PoolError {
    /// Whether this error comes from misuse of the pool rather than the backend
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::NotInitialized(_))
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
