//! Data-access errors

use datalink_common::AppError;
use datalink_core::PoolError;

/// Errors raised by data-access operations
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Invalid table or column name: {0:?}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Column {column:?} has type {type_name}, which cannot be decoded; cast it in the query")]
    UnsupportedType { column: String, type_name: String },

    #[error("Cannot bind {0} as a statement parameter")]
    UnsupportedValue(&'static str),
}

impl DbError {
    /// Caller-side mistake rather than a backend failure
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_) | Self::UnsupportedValue(_))
    }
}

/// Result type for data-access operations
pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidIdentifier(name) => {
                AppError::InvalidInput(format!("invalid identifier {name:?}"))
            }
            DbError::UnsupportedValue(kind) => {
                AppError::InvalidInput(format!("cannot bind {kind}"))
            }
            DbError::Pool(e) => AppError::Pool(e),
            other => AppError::database(other),
        }
    }
}
