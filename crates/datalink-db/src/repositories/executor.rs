//! Single-statement execution on a checked-out connection

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Postgres};

use crate::mappers::decode_row;
use crate::models::{SqlRow, SqlValue};

use super::error::{DbError, DbResult};

/// What [`DataAccess`](super::DataAccess) needs from a pooled connection
#[async_trait]
pub trait StatementExecutor: Send {
    /// Run one statement in its own transaction
    ///
    /// Commits on success and rolls back on failure. Returns the number of
    /// affected rows.
    async fn execute_in_transaction(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64>;

    /// Run a statement and decode every returned row
    async fn fetch_all(&mut self, sql: &str) -> DbResult<Vec<SqlRow>>;
}

#[async_trait]
impl StatementExecutor for PgConnection {
    async fn execute_in_transaction(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let query = params.iter().try_fold(sqlx::query(sql), bind_value)?;

        let mut tx = self.begin().await?;
        match query.execute(&mut *tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                Err(e.into())
            }
        }
    }

    async fn fetch_all(&mut self, sql: &str) -> DbResult<Vec<SqlRow>> {
        let rows = sqlx::query(sql).fetch_all(&mut *self).await?;
        rows.iter().map(decode_row).collect()
    }
}

/// Bind one parameter
///
/// NULL has no type of its own for Postgres to coerce, so statements carry it
/// as a literal and it is refused here, as are arrays.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> DbResult<Query<'q, Postgres, PgArguments>> {
    let query = match value {
        SqlValue::Null => return Err(DbError::UnsupportedValue("NULL")),
        SqlValue::Array(_) => return Err(DbError::UnsupportedValue("an array")),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Numeric(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Bytes(v) => query.bind(v.as_slice()),
        SqlValue::Json(v) => query.bind(sqlx::types::Json(v)),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::DateTime(v) => query.bind(*v),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Time(v) => query.bind(*v),
        SqlValue::Uuid(v) => query.bind(*v),
    };
    Ok(query)
}
