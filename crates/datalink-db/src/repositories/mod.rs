//! Data-access operations over the read and write pools

mod data_access;
mod error;
mod executor;
mod statement;

pub use data_access::{DataAccess, PgDataAccess};
pub use error::{DbError, DbResult};
pub use executor::StatementExecutor;
pub use statement::{build_insert_sql, validate_identifier};
