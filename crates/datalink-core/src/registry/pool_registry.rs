//! Registry of named pools sharing one connection manager

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::{PoolDefaults, PoolRequest};
use crate::error::PoolResult;
use crate::instrument::RetryPolicy;
use crate::pool::{ConnectionManager, PoolRole, PoolStatus, ResourcePool};

/// Hands out one shared [`ResourcePool`] per resolved pool name
///
/// Build one registry at startup and pass it to whatever needs a pool.
/// Pools are created lazily on first request and kept for the registry's
/// lifetime. When read and write roles resolve to the same name they share
/// the same pool.
pub struct PoolRegistry<M: ConnectionManager> {
    manager: Arc<M>,
    defaults: PoolDefaults,
    retry: RetryPolicy,
    pools: DashMap<String, Arc<ResourcePool<M>>>,
}

impl<M: ConnectionManager> fmt::Debug for PoolRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("defaults", &self.defaults)
            .field("retry", &self.retry)
            .field("pools", &self.statuses())
            .finish()
    }
}

impl<M: ConnectionManager> PoolRegistry<M> {
    pub fn new(manager: M, defaults: PoolDefaults, retry: RetryPolicy) -> Self {
        Self::with_shared_manager(Arc::new(manager), defaults, retry)
    }

    pub fn with_shared_manager(manager: Arc<M>, defaults: PoolDefaults, retry: RetryPolicy) -> Self {
        Self {
            manager,
            defaults,
            retry,
            pools: DashMap::new(),
        }
    }

    pub fn defaults(&self) -> &PoolDefaults {
        &self.defaults
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// The ready pool for `role`, created on first use
    pub async fn pool(&self, role: PoolRole) -> PoolResult<Arc<ResourcePool<M>>> {
        self.pool_for(PoolRequest::from(role)).await
    }

    /// The ready pool for a request with optional name and size overrides
    ///
    /// Waits, retrying under the registry's policy, until the backend
    /// accepts the pool's first connection. A size override is ignored when
    /// the named pool already exists.
    pub async fn pool_for(&self, request: PoolRequest) -> PoolResult<Arc<ResourcePool<M>>> {
        let config = self.defaults.resolve(&request);

        let pool = self
            .pools
            .entry(config.name().to_string())
            .or_insert_with(|| {
                tracing::debug!(
                    pool = %config.name(),
                    role = %config.role(),
                    size = config.size(),
                    "Registering connection pool"
                );
                Arc::new(ResourcePool::new(config.clone(), Arc::clone(&self.manager), self.retry))
            })
            .value()
            .clone();

        if pool.role() != config.role() {
            tracing::debug!(
                pool = %pool.name(),
                owner_role = %pool.role(),
                requested_role = %config.role(),
                "Roles share a pool"
            );
        }
        if pool.config().size() != config.size() {
            tracing::warn!(
                pool = %pool.name(),
                size = pool.config().size(),
                requested_size = config.size(),
                "Pool already exists with a different size"
            );
        }

        pool.create().await?;
        Ok(pool)
    }

    /// An already registered pool, without creating anything
    pub fn get(&self, name: &str) -> Option<Arc<ResourcePool<M>>> {
        self.pools.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Status of every registered pool, sorted by name
    pub fn statuses(&self) -> Vec<PoolStatus> {
        let mut statuses: Vec<_> = self.pools.iter().map(|entry| entry.value().status()).collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }
}
