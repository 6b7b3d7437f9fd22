//! # datalink-core
//!
//! Bounded connection pooling with read/write role separation and
//! retry-forever lifecycle operations.
//!
//! ## Overview
//!
//! - [`instrument`]: the [`Operation`] capability plus the [`Timed`] and
//!   [`Retried`] wrappers composed around pool lifecycle calls
//! - [`pool`]: [`ResourcePool`], a bounded set of connections produced by a
//!   [`ConnectionManager`]
//! - [`registry`]: [`PoolRegistry`], one shared pool per resolved name
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datalink_core::{PoolDefaults, PoolRegistry, PoolRole, RetryPolicy};
//!
//! async fn example(manager: MyManager) -> Result<(), datalink_core::PoolError> {
//!     let registry = PoolRegistry::new(manager, PoolDefaults::default(), RetryPolicy::default());
//!     let pool = registry.pool(PoolRole::Read).await?;
//!     let mut conn = pool.acquire().await?;
//!     // Use the connection...
//!     conn.release();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod instrument;
pub mod pool;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PoolError, PoolResult, RetryError};
pub use instrument::{operation, FnOperation, Operation, OperationExt, Retried, RetryPolicy, Timed};
pub use pool::{
    ConnectionManager, PoolConfig, PoolRole, PoolState, PoolStatus, PooledConnection, ResourcePool,
};
pub use registry::{PoolDefaults, PoolRegistry, PoolRequest, DEFAULT_POOL_NAME, DEFAULT_POOL_SIZE};
