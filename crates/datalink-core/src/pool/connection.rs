//! Checked-out connection guard

use std::fmt;
use std::ops::{Deref, DerefMut};

use tokio::sync::SemaphorePermit;

use super::{ConnectionManager, ResourcePool};

/// A connection borrowed from a [`ResourcePool`]
///
/// The connection goes back to its pool exactly once: either through an
/// explicit [`release`](Self::release) or when the guard is dropped, so every
/// exit path of the caller returns it.
///
/// # Panics
///
/// Dereferencing the guard after [`release`](Self::release) panics, since the
/// connection is already back in the pool. Use [`get`](Self::get) or
/// [`get_mut`](Self::get_mut) where the guard may have been released.
pub struct PooledConnection<'a, M: ConnectionManager> {
    pool: &'a ResourcePool<M>,
    connection: Option<M::Connection>,
    permit: Option<SemaphorePermit<'a>>,
}

impl<'a, M: ConnectionManager> PooledConnection<'a, M> {
    pub(crate) fn new(
        pool: &'a ResourcePool<M>,
        connection: M::Connection,
        permit: SemaphorePermit<'a>,
    ) -> Self {
        Self {
            pool,
            connection: Some(connection),
            permit: Some(permit),
        }
    }

    /// The pool this connection belongs to
    pub fn pool(&self) -> &'a ResourcePool<M> {
        self.pool
    }

    pub fn is_released(&self) -> bool {
        self.connection.is_none()
    }

    /// The live connection, or `None` once released
    pub fn get(&self) -> Option<&M::Connection> {
        self.connection.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut M::Connection> {
        self.connection.as_mut()
    }

    /// Return the connection to its pool
    ///
    /// Returns `false` and logs a warning when the connection was already
    /// released; nothing else happens in that case.
    pub fn release(&mut self) -> bool {
        let Some(connection) = self.connection.take() else {
            tracing::warn!(
                pool = %self.pool.name(),
                "Attempted to close an invalid or already closed connection"
            );
            return false;
        };

        self.pool.return_connection(connection);
        // Slot is freed only after the connection is back in the idle list.
        self.permit.take();
        true
    }
}

impl<M: ConnectionManager> Deref for PooledConnection<'_, M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection used after release")
    }
}

impl<M: ConnectionManager> DerefMut for PooledConnection<'_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("connection used after release")
    }
}

impl<M: ConnectionManager> Drop for PooledConnection<'_, M> {
    fn drop(&mut self) {
        if !self.is_released() {
            self.release();
        }
    }
}

impl<M: ConnectionManager> fmt::Debug for PooledConnection<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("pool", &self.pool.name())
            .field("released", &self.is_released())
            .finish()
    }
}
