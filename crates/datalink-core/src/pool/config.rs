//! Pool identity and sizing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload a pool serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolRole {
    #[default]
    Default,
    Read,
    Write,
}

impl PoolRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PoolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration of a single pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    role: PoolRole,
    name: String,
    size: usize,
}

impl PoolConfig {
    /// Create a pool configuration
    ///
    /// A size of zero is raised to one: a pool always admits at least one holder.
    pub fn new(role: PoolRole, name: impl Into<String>, size: usize) -> Self {
        Self {
            role,
            name: name.into(),
            size: size.max(1),
        }
    }

    #[must_use]
    pub fn role(&self) -> PoolRole {
        self.role
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of connections checked out at once
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}
