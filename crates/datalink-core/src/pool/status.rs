//! Point-in-time pool statistics

use serde::Serialize;

use super::PoolRole;

/// Snapshot of a pool's occupancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub name: String,
    pub role: PoolRole,
    /// Maximum simultaneous holders
    pub size: usize,
    /// Open connections waiting in the idle list
    pub idle: usize,
    /// Connections currently checked out
    pub in_use: usize,
    /// Callers blocked waiting for a free slot
    pub waiting: usize,
    /// Failed create/acquire attempts since the pool was built
    pub failed_attempts: u64,
}

impl PoolStatus {
    /// Slots that can be granted without waiting
    #[must_use]
    pub fn available(&self) -> usize {
        self.size.saturating_sub(self.in_use)
    }
}
