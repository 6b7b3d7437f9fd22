//! Database connection pool management

mod postgres;

pub use postgres::{create_registry, PgConnectionManager, PgPoolRegistry};
