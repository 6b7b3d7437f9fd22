//! The bounded pool and its lifecycle

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OnceCell, Semaphore, SemaphorePermit};

use super::{ConnectionManager, PoolConfig, PoolRole, PoolStatus, PooledConnection};
use crate::error::{PoolError, PoolResult};
use crate::instrument::{operation, Operation, OperationExt, RetryPolicy};

/// Lifecycle of a pool
///
/// `Creating` loops on itself while the backend is unreachable; there is no
/// failed or closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Uninitialized,
    Creating,
    Ready,
}

/// A bounded set of reusable connections to one backend
///
/// At most `size` connections are checked out at once; further callers wait
/// in FIFO order on a semaphore. Opening a connection goes through the
/// [`ConnectionManager`], and failures there are retried under the pool's
/// [`RetryPolicy`].
pub struct ResourcePool<M: ConnectionManager> {
    config: PoolConfig,
    manager: Arc<M>,
    retry: RetryPolicy,
    idle: Mutex<VecDeque<M::Connection>>,
    semaphore: Semaphore,
    ready: OnceCell<()>,
    creating: AtomicBool,
    waiting: AtomicUsize,
    failed_attempts: AtomicU64,
}

impl<M: ConnectionManager> fmt::Debug for ResourcePool<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("state", &self.state())
            .field("status", &self.status())
            .finish()
    }
}

impl<M: ConnectionManager> ResourcePool<M> {
    /// Build an uninitialized pool; call [`create`](Self::create) before acquiring
    pub fn new(config: PoolConfig, manager: Arc<M>, retry: RetryPolicy) -> Self {
        let semaphore = Semaphore::new(config.size());
        Self {
            config,
            manager,
            retry,
            idle: Mutex::new(VecDeque::new()),
            semaphore,
            ready: OnceCell::new(),
            creating: AtomicBool::new(false),
            waiting: AtomicUsize::new(0),
            failed_attempts: AtomicU64::new(0),
        }
    }

    /// Build a pool and drive it to `Ready`
    pub async fn connect(config: PoolConfig, manager: Arc<M>, retry: RetryPolicy) -> PoolResult<Self> {
        let pool = Self::new(config, manager, retry);
        pool.create().await?;
        Ok(pool)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn role(&self) -> PoolRole {
        self.config.role()
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn state(&self) -> PoolState {
        if self.ready.initialized() {
            PoolState::Ready
        } else if self.creating.load(Ordering::SeqCst) {
            PoolState::Creating
        } else {
            PoolState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Open the first connection, retrying until the backend answers
    ///
    /// Concurrent callers share a single creation. Once `Ready` this returns
    /// immediately. Only a retry deadline can make it fail.
    pub async fn create(&self) -> PoolResult<()> {
        self.ready.get_or_try_init(|| self.run_create()).await?;
        Ok(())
    }

    async fn run_create(&self) -> PoolResult<()> {
        let _creating = FlagGuard::raise(&self.creating);
        let manager = &self.manager;

        let op = operation("create_pool", move || manager.connect())
            .timed()
            .retried(self.retry);
        let result = op.call().await;
        self.failed_attempts.fetch_add(op.failures(), Ordering::Relaxed);
        let connection = result?;

        self.idle.lock().push_back(connection);
        tracing::info!(
            pool = %self.config.name(),
            role = %self.config.role(),
            size = self.config.size(),
            "Connection pool '{}' created with size {}",
            self.config.name(),
            self.config.size()
        );
        Ok(())
    }

    /// Check out a connection
    ///
    /// Fails at once with [`PoolError::NotInitialized`] if the pool was never
    /// created. Otherwise waits for a free slot and retries connection errors
    /// until one succeeds.
    pub async fn acquire(&self) -> PoolResult<PooledConnection<'_, M>> {
        if !self.is_ready() {
            tracing::error!(pool = %self.config.name(), "Connection pool is not initialized");
            return Err(PoolError::NotInitialized(self.config.name().to_string()));
        }

        let op = operation("get_connection", move || self.try_acquire())
            .timed()
            .retried(self.retry);
        let result = op.call().await;
        self.failed_attempts.fetch_add(op.failures(), Ordering::Relaxed);
        Ok(result?)
    }

    async fn try_acquire(&self) -> PoolResult<PooledConnection<'_, M>> {
        let permit = self.wait_for_permit().await?;

        let connection = match self.take_idle().await {
            Some(connection) => connection,
            None => self.manager.connect().await.map_err(|e| {
                tracing::error!(pool = %self.config.name(), error = %e, "Error getting connection from pool");
                PoolError::Backend(e.to_string())
            })?,
        };

        tracing::info!(pool = %self.config.name(), "Successfully obtained a connection from the pool");
        Ok(PooledConnection::new(self, connection, permit))
    }

    async fn wait_for_permit(&self) -> PoolResult<SemaphorePermit<'_>> {
        if let Ok(permit) = self.semaphore.try_acquire() {
            return Ok(permit);
        }

        let _waiting = CountGuard::enter(&self.waiting);
        tracing::debug!(pool = %self.config.name(), "Pool exhausted, waiting for a connection");
        self.semaphore
            .acquire()
            .await
            .map_err(|_| PoolError::Closed(self.config.name().to_string()))
    }

    async fn take_idle(&self) -> Option<M::Connection> {
        while let Some(mut connection) = self.pop_idle() {
            if self.manager.is_valid(&mut connection).await {
                return Some(connection);
            }
            tracing::warn!(pool = %self.config.name(), "Discarding invalid idle connection");
        }
        None
    }

    fn pop_idle(&self) -> Option<M::Connection> {
        self.idle.lock().pop_front()
    }

    /// Release a connection checked out from this pool
    ///
    /// Same as [`PooledConnection::release`]. A connection from another pool
    /// is left untouched.
    pub fn release(&self, connection: &mut PooledConnection<'_, M>) -> bool {
        if !std::ptr::eq(connection.pool(), self) {
            tracing::warn!(
                pool = %self.config.name(),
                owner = %connection.pool().name(),
                "Attempted to release a connection into a pool that does not own it"
            );
            return false;
        }
        connection.release()
    }

    pub(crate) fn return_connection(&self, connection: M::Connection) {
        if self.manager.has_broken(&connection) {
            tracing::warn!(
                pool = %self.config.name(),
                "Attempted to release an invalid or already closed connection"
            );
            return;
        }

        let kept = {
            let mut idle = self.idle.lock();
            if idle.len() < self.config.size() {
                idle.push_back(connection);
                true
            } else {
                false
            }
        };

        if kept {
            tracing::info!(pool = %self.config.name(), "Connection closed and returned to the pool");
        } else {
            tracing::debug!(pool = %self.config.name(), "Idle list full, closing connection");
        }
    }

    /// Current occupancy
    pub fn status(&self) -> PoolStatus {
        let size = self.config.size();
        PoolStatus {
            name: self.config.name().to_string(),
            role: self.config.role(),
            size,
            idle: self.idle.lock().len(),
            in_use: size.saturating_sub(self.semaphore.available_permits()),
            waiting: self.waiting.load(Ordering::SeqCst),
            failed_attempts: self.failed_attempts.load(Ordering::Relaxed),
        }
    }
}

/// Holds a flag raised until dropped, including on cancellation
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Increments a counter for as long as it lives
struct CountGuard<'a>(&'a AtomicUsize);

impl<'a> CountGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
