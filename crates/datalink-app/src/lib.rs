//! # datalink-app
//!
//! Builds the data layer from configuration and runs the startup query.

use std::sync::Arc;

use datalink_cache::CacheClient;
use datalink_common::{AppConfig, AppResult};
use datalink_db::{create_registry, PgDataAccess};
use tracing::{info, warn};

/// Query run once at startup
pub const STARTUP_QUERY: &str = "SELECT * FROM user_details";

/// Everything the application needs to reach its backends
#[derive(Clone)]
pub struct Services {
    pub data: PgDataAccess,
    pub cache: CacheClient,
}

impl Services {
    /// Wire the pool registry and the cache client
    ///
    /// Opens no connection; pools are created on first use.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let registry = create_registry(&config.database, config.retry.policy());
        let data = PgDataAccess::new(Arc::new(registry));
        let cache = CacheClient::from_config(&config.cache)?;
        Ok(Self { data, cache })
    }
}

/// Run the startup sequence against the configured backends
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let services = Services::from_config(&config)?;

    if let Err(e) = services.cache.health_check().await {
        warn!(error = %e, "Cache unavailable at startup");
    }

    let rows = services.data.query(STARTUP_QUERY).await;
    info!(rows = rows.len(), "Startup query finished");
    for row in &rows {
        info!(row = %serde_json::to_string(row)?, "user_details");
    }

    for status in services.data.pools().statuses() {
        info!(
            pool = %status.name,
            role = %status.role,
            size = status.size,
            idle = status.idle,
            in_use = status.in_use,
            "Pool status"
        );
    }

    Ok(())
}
