//! PostgreSQL connection manager

use std::fmt;

use async_trait::async_trait;
use datalink_common::DatabaseConfig;
use datalink_core::{ConnectionManager, PoolRegistry, RetryPolicy};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};

/// Opens PostgreSQL connections for the pools of a [`PoolRegistry`]
#[derive(Clone)]
pub struct PgConnectionManager {
    options: PgConnectOptions,
    target: String,
}

impl fmt::Debug for PgConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConnectionManager")
            .field("target", &self.target)
            .finish()
    }
}

impl PgConnectionManager {
    pub fn new(options: PgConnectOptions) -> Self {
        let target = format!(
            "{}:{}/{}",
            options.get_host(),
            options.get_port(),
            options.get_database().unwrap_or_default()
        );
        Self { options, target }
    }

    /// Build connect options from the resolved database configuration
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);
        Self::new(options)
    }

    /// `host:port/database`, safe to log
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl From<&DatabaseConfig> for PgConnectionManager {
    fn from(config: &DatabaseConfig) -> Self {
        Self::from_config(config)
    }
}

#[async_trait]
impl ConnectionManager for PgConnectionManager {
    type Connection = PgConnection;
    type Error = sqlx::Error;

    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        let connection = self.options.connect().await?;
        tracing::debug!(target_db = %self.target, "Opened PostgreSQL connection");
        Ok(connection)
    }

    async fn is_valid(&self, conn: &mut PgConnection) -> bool {
        conn.ping().await.is_ok()
    }
}

/// Pool registry backed by PostgreSQL
pub type PgPoolRegistry = PoolRegistry<PgConnectionManager>;

/// Create the process-wide pool registry from configuration
///
/// No connection is opened until a pool is first requested.
pub fn create_registry(config: &DatabaseConfig, retry: RetryPolicy) -> PgPoolRegistry {
    let manager = PgConnectionManager::from_config(config);
    tracing::info!(
        target_db = %manager.target(),
        pool_size = ?config.pool_size,
        retry_delay_secs = retry.delay().as_secs_f64(),
        "Database pool registry created"
    );
    PoolRegistry::new(manager, config.pool_defaults(), retry)
}
