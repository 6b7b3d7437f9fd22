//! One shared pool per resolved name
//!
//! [`PoolDefaults`] turn a role plus optional overrides into a
//! [`PoolConfig`](crate::PoolConfig); [`PoolRegistry`] builds each named pool
//! once and hands the same instance to every caller.

mod defaults;
mod pool_registry;

pub use defaults::{PoolDefaults, PoolRequest, DEFAULT_POOL_NAME, DEFAULT_POOL_SIZE};
pub use pool_registry::PoolRegistry;
