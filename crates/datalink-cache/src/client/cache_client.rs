//! Key-value operations over the shared Redis pool.

use datalink_common::CacheConfig;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use crate::pool::{CacheError, CacheResult, RedisPool, SharedRedisPool};

/// Process-wide cache client
///
/// Cheap to clone; every clone shares the same pool. Failures are logged
/// at error level and returned, never retried.
#[derive(Debug, Clone)]
pub struct CacheClient {
    pool: SharedRedisPool,
}

impl CacheClient {
    pub fn new(pool: SharedRedisPool) -> Self {
        Self { pool }
    }

    /// Build the shared pool from the application cache settings
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Ok(Self::new(Arc::new(RedisPool::from_config(config)?)))
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    /// Value stored under `key`, if any
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let result = async {
            let mut conn = self.pool.get().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, CacheError>(value)
        }
        .await;
        logged(result, "Redis GET error")
    }

    /// Store `value` under `key`, expiring after `ttl_seconds` when given
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let result = async {
            if ttl_seconds == Some(0) {
                return Err(CacheError::InvalidTtl);
            }
            let mut conn = self.pool.get().await?;
            match ttl_seconds {
                Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
                None => conn.set::<_, _, ()>(key, value).await?,
            }
            Ok::<_, CacheError>(())
        }
        .await;
        logged(result, "Redis SET error")
    }

    /// Remove `key`; `true` when something was deleted
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        let result = async {
            let mut conn = self.pool.get().await?;
            let deleted: i64 = conn.del(key).await?;
            Ok::<_, CacheError>(deleted > 0)
        }
        .await;
        logged(result, "Redis DELETE error")
    }

    /// Check if a key exists
    #[instrument(skip(self))]
    pub async fn exists(&self, key: &str) -> CacheResult<bool> {
        let result = async {
            let mut conn = self.pool.get().await?;
            let exists: bool = conn.exists(key).await?;
            Ok::<_, CacheError>(exists)
        }
        .await;
        logged(result, "Redis EXISTS error")
    }

    /// Remaining time to live of a key in seconds
    ///
    /// `None` when the key does not exist, `Some(-1)` when it never expires.
    #[instrument(skip(self))]
    pub async fn ttl(&self, key: &str) -> CacheResult<Option<i64>> {
        let result = async {
            let mut conn = self.pool.get().await?;
            let ttl: i64 = conn.ttl(key).await?;
            // -2: no such key
            Ok::<_, CacheError>((ttl != -2).then_some(ttl))
        }
        .await;
        logged(result, "Redis TTL error")
    }

    /// Serialize `value` as JSON and store it
    pub async fn set_json<V: Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let serialized = logged(
            serde_json::to_string(value).map_err(CacheError::from),
            "Cache serialization error",
        )?;
        self.set(key, &serialized, ttl_seconds).await
    }

    /// Fetch and deserialize a JSON value
    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<V>> {
        match self.get(key).await? {
            Some(raw) => logged(
                serde_json::from_str(&raw).map(Some).map_err(CacheError::from),
                "Cache deserialization error",
            ),
            None => Ok(None),
        }
    }

    /// PING the server
    pub async fn health_check(&self) -> CacheResult<()> {
        logged(self.pool.health_check().await, "Redis PING error")
    }
}

fn logged<T>(result: CacheResult<T>, message: &'static str) -> CacheResult<T> {
    if let Err(e) = &result {
        tracing::error!(error = %e, "{}", message);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::RedisPoolConfig;

    // Nothing listens on port 1, so every command fails fast.
    fn unreachable_client() -> CacheClient {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:1/0".to_string(),
            max_connections: 2,
        })
        .unwrap();
        CacheClient::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected_locally() {
        let client = unreachable_client();
        let err = client.set("k", "v", Some(0)).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidTtl));
        assert_eq!(client.pool().status().size, 0);
    }

    #[tokio::test]
    async fn test_backend_errors_are_returned() {
        let client = unreachable_client();

        assert!(matches!(client.get("k").await, Err(CacheError::GetConnection(_))));
        assert!(client.set("k", "v", Some(5)).await.is_err());
        assert!(client.delete("k").await.is_err());
        assert!(client.exists("k").await.is_err());
        assert!(client.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_pool() {
        let client = unreachable_client();
        let clone = client.clone();
        assert!(std::ptr::eq(client.pool(), clone.pool()));
    }
}
