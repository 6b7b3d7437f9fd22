//! Pool name and size resolution

use crate::pool::{PoolConfig, PoolRole};

/// Name used when neither the caller nor the configuration provides one
pub const DEFAULT_POOL_NAME: &str = "default_pool";

/// Size used when neither the caller nor the configuration provides one
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Process-wide fallbacks for pool names and size
///
/// Empty names and a zero size count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolDefaults {
    /// Generic pool name
    pub name: Option<String>,
    /// Name for the read role
    pub read_name: Option<String>,
    /// Name for the write role
    pub write_name: Option<String>,
    pub size: Option<usize>,
}

impl PoolDefaults {
    /// Resolve a pool name
    ///
    /// Order: explicit name, role-specific default, generic default,
    /// then [`DEFAULT_POOL_NAME`].
    pub fn resolve_name(&self, role: PoolRole, explicit: Option<&str>) -> String {
        let role_default = match role {
            PoolRole::Read => self.read_name.as_deref(),
            PoolRole::Write => self.write_name.as_deref(),
            PoolRole::Default => None,
        };

        [explicit, role_default, self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(DEFAULT_POOL_NAME)
            .to_string()
    }

    /// Resolve a pool size: explicit, configured default, then [`DEFAULT_POOL_SIZE`]
    pub fn resolve_size(&self, explicit: Option<usize>) -> usize {
        [explicit, self.size]
            .into_iter()
            .flatten()
            .find(|size| *size > 0)
            .unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn resolve(&self, request: &PoolRequest) -> PoolConfig {
        PoolConfig::new(
            request.role,
            self.resolve_name(request.role, request.name.as_deref()),
            self.resolve_size(request.size),
        )
    }
}

/// A caller's request for a pool, before defaults are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolRequest {
    pub role: PoolRole,
    pub name: Option<String>,
    pub size: Option<usize>,
}

impl PoolRequest {
    pub fn new(role: PoolRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

impl From<PoolRole> for PoolRequest {
    fn from(role: PoolRole) -> Self {
        Self::new(role)
    }
}
