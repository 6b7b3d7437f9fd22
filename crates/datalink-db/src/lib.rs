//! # datalink-db
//!
//! PostgreSQL backend for the datalink pools, plus the data-access
//! operations built on top of them.
//!
//! ## Overview
//!
//! - [`pool`]: [`PgConnectionManager`] opens connections for a
//!   [`PoolRegistry`](datalink_core::PoolRegistry)
//! - [`models`]: [`SqlValue`] and row types exchanged with callers
//! - [`mappers`]: decoding of Postgres rows into [`SqlRow`]s
//! - [`repositories`]: [`DataAccess`] with `insert` on the write pool and
//!   `query` on the read pool
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datalink_common::AppConfig;
//! use datalink_db::{PgDataAccess, RowData, SqlValue};
//!
//! async fn example(config: &AppConfig) {
//!     let data = PgDataAccess::from_config(config);
//!
//!     let mut row = RowData::new();
//!     row.insert("name".to_string(), SqlValue::from("O'Brien"));
//!     let inserted = data.insert("users", &row).await;
//!
//!     let rows = data.query("SELECT * FROM users").await;
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use models::{RowData, SqlRow, SqlValue};
pub use pool::{create_registry, PgConnectionManager, PgPoolRegistry};
pub use repositories::{
    build_insert_sql, validate_identifier, DataAccess, DbError, DbResult, PgDataAccess,
    StatementExecutor,
};
