//! Insert and query operations
//!
//! Each operation acquires a connection from the pool of its role, runs one
//! statement and hands the connection back, whatever the outcome. Writes go
//! to the write pool, reads to the read pool.

use std::sync::Arc;

use datalink_common::AppConfig;
use datalink_core::{ConnectionManager, PoolRegistry, PoolRole};
use tracing::instrument;

use crate::models::{RowData, SqlRow, SqlValue};
use crate::pool::{create_registry, PgConnectionManager};

use super::error::{DbError, DbResult};
use super::executor::StatementExecutor;
use super::statement::{build_insert_sql, validate_identifier};

/// Data-access operations over a shared [`PoolRegistry`]
pub struct DataAccess<M: ConnectionManager> {
    pools: Arc<PoolRegistry<M>>,
}

impl<M: ConnectionManager> Clone for DataAccess<M> {
    fn clone(&self) -> Self {
        Self {
            pools: Arc::clone(&self.pools),
        }
    }
}

/// Data access backed by PostgreSQL
pub type PgDataAccess = DataAccess<PgConnectionManager>;

impl PgDataAccess {
    /// Build the registry from configuration and wrap it
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(create_registry(&config.database, config.retry.policy())))
    }
}

impl<M> DataAccess<M>
where
    M: ConnectionManager,
    M::Connection: StatementExecutor,
{
    pub fn new(pools: Arc<PoolRegistry<M>>) -> Self {
        Self { pools }
    }

    pub fn pools(&self) -> &PoolRegistry<M> {
        &self.pools
    }

    /// Insert one row into `table` through the write pool
    ///
    /// Values are bound as parameters. Identifiers are checked before any
    /// connection is requested.
    #[instrument(skip(self, row), fields(columns = row.len()))]
    pub async fn try_insert(&self, table: &str, row: &RowData) -> DbResult<u64> {
        if let Some(invalid) = std::iter::once(table)
            .chain(row.keys().map(String::as_str))
            .find(|name| !validate_identifier(name))
        {
            tracing::error!(identifier = invalid, "Invalid table name or column names.");
            return Err(DbError::InvalidIdentifier(invalid.to_string()));
        }

        let sql = build_insert_sql(table, row.iter().map(|(name, value)| (name.as_str(), value)));
        let values: Vec<SqlValue> = row.values().filter(|v| !v.is_null()).cloned().collect();

        let result = self.execute_on(PoolRole::Write, &sql, &values).await;
        match &result {
            Ok(_) => tracing::info!("Data inserted successfully into {}", table),
            Err(e) => tracing::error!(error = %e, "Error inserting data into {}", table),
        }
        result
    }

    /// Insert one row, reporting only success or failure
    pub async fn insert(&self, table: &str, row: &RowData) -> bool {
        self.try_insert(table, row).await.is_ok()
    }

    /// Run a statement without parameters through the write pool
    #[instrument(skip(self))]
    pub async fn try_execute(&self, statement: &str) -> DbResult<u64> {
        let result = self.execute_on(PoolRole::Write, statement, &[]).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "An error occurred while executing statement");
        }
        result
    }

    /// Run a statement through the read pool and return every row
    #[instrument(skip(self))]
    pub async fn try_query(&self, statement: &str) -> DbResult<Vec<SqlRow>> {
        let pool = self.pools.pool(PoolRole::Read).await?;
        let mut conn = pool.acquire().await?;
        let result = conn.fetch_all(statement).await;
        conn.release();

        if let Err(e) = &result {
            tracing::error!(error = %e, "An error occurred while fetching data");
        }
        result
    }

    /// Run a statement through the read pool; any failure yields no rows
    pub async fn query(&self, statement: &str) -> Vec<SqlRow> {
        self.try_query(statement).await.unwrap_or_default()
    }

    async fn execute_on(&self, role: PoolRole, sql: &str, values: &[SqlValue]) -> DbResult<u64> {
        let pool = self.pools.pool(role).await?;
        let mut conn = pool.acquire().await?;
        let result = conn.execute_in_transaction(sql, values).await;
        conn.release();
        result
    }
}
