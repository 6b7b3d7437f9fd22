//! # datalink-cache
//!
//! Redis key-value cache for the data layer.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Cache Client**: One shared client with get/set/delete and optional expiry
//!
//! Backend failures are logged and returned to the caller; nothing here retries.
//!
//! ## Example
//!
//! ```ignore
//! use datalink_cache::CacheClient;
//! use datalink_common::AppConfig;
//!
//! let config = AppConfig::from_env()?;
//! let cache = CacheClient::from_config(&config.cache)?;
//!
//! cache.set("session:42", "active", Some(300)).await?;
//! let value = cache.get("session:42").await?;
//! ```

pub mod client;
pub mod pool;

pub use client::CacheClient;
pub use pool::{
    create_shared_pool, CacheError, CacheResult, RedisPool, RedisPoolConfig, SharedRedisPool,
};
