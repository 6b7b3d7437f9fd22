//! Bounded connection pool
//!
//! A [`ResourcePool`] hands out at most `size` connections at a time. The
//! connections themselves come from a [`ConnectionManager`], which is the
//! only backend-specific piece. Creation and acquisition run under the
//! retry-forever policy, so a pool absorbs an unreachable backend as added
//! latency rather than an error.

mod config;
mod connection;
mod manager;
mod resource_pool;
mod status;

#[cfg(test)]
mod tests;

pub use config::{PoolConfig, PoolRole};
pub use connection::PooledConnection;
pub use manager::ConnectionManager;
pub use resource_pool::{PoolState, ResourcePool};
pub use status::PoolStatus;
