//! Shared cache client

mod cache_client;

pub use cache_client::CacheClient;
