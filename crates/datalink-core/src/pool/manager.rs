//! Backend hook for opening and checking connections

use async_trait::async_trait;

/// Opens connections to one backend on behalf of a [`ResourcePool`](super::ResourcePool)
#[async_trait]
pub trait ConnectionManager: Send + Sync + 'static {
    /// The live connection handed to callers
    type Connection: Send + 'static;
    /// Error raised when a connection cannot be opened
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a new connection
    async fn connect(&self) -> Result<Self::Connection, Self::Error>;

    /// Check an idle connection before handing it out again
    ///
    /// Invalid connections are discarded and replaced. Defaults to `true`.
    async fn is_valid(&self, _conn: &mut Self::Connection) -> bool {
        true
    }

    /// Cheap synchronous check run when a connection is released
    ///
    /// Broken connections are dropped instead of returning to the idle list.
    fn has_broken(&self, _conn: &Self::Connection) -> bool {
        false
    }
}
