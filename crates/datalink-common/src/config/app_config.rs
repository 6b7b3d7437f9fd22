//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional `.env` file.

use datalink_core::{PoolDefaults, RetryPolicy};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub logging: LogConfig,
    pub retry: RetryConfig,
}

/// Relational database connection and pool settings
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    /// Generic pool name (`DATABASE_POOL`)
    #[serde(default)]
    pub pool_name: Option<String>,
    /// Read-role pool name (`DATABASE_POOL_READ`)
    #[serde(default)]
    pub pool_name_read: Option<String>,
    /// Write-role pool name (`DATABASE_POOL_WRITE`)
    #[serde(default)]
    pub pool_name_write: Option<String>,
    #[serde(default)]
    pub pool_size: Option<usize>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("pool_name", &self.pool_name)
            .field("pool_name_read", &self.pool_name_read)
            .field("pool_name_write", &self.pool_name_write)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

impl DatabaseConfig {
    /// Fallback pool names and size for the pool registry
    #[must_use]
    pub fn pool_defaults(&self) -> PoolDefaults {
        PoolDefaults {
            name: self.pool_name.clone(),
            read_name: self.pool_name_read.clone(),
            write_name: self.pool_name_write.clone(),
            size: self.pool_size,
        }
    }
}

/// Key-value cache settings
#[derive(Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_host")]
    pub host: String,
    #[serde(default = "default_cache_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_cache_max_connections")]
    pub max_connections: usize,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl CacheConfig {
    /// Connection URL, e.g. `redis://:secret@localhost:6379/0`
    #[must_use]
    pub fn url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!("redis://:{}@{}:{}/{}", password, self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Retry policy for pool creation and acquisition
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_delay_secs")]
    pub delay_secs: u64,
    /// Unset means retry forever
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl RetryConfig {
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::fixed(Duration::from_secs(self.delay_secs));
        match self.deadline_secs {
            Some(secs) => policy.with_deadline(Duration::from_secs(secs)),
            None => policy,
        }
    }
}

// Default value functions
fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "postgres".to_string()
}

fn default_cache_host() -> String {
    "localhost".to_string()
}

fn default_cache_port() -> u16 {
    6379
}

fn default_cache_max_connections() -> usize {
    10
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_retry_delay_secs() -> u64 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    /// Returns an error if a variable holds a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Ok(Self {
            database: DatabaseConfig {
                host: text("DATABASE_HOST").unwrap_or_else(default_db_host),
                port: parse(&lookup, "DATABASE_PORT")?.unwrap_or_else(default_db_port),
                user: text("DATABASE_USER").unwrap_or_else(default_db_user),
                password: lookup("DATABASE_PASSWORD").unwrap_or_default(),
                name: text("DATABASE_NAME").unwrap_or_else(default_db_name),
                pool_name: text("DATABASE_POOL"),
                pool_name_read: text("DATABASE_POOL_READ"),
                pool_name_write: text("DATABASE_POOL_WRITE"),
                pool_size: parse(&lookup, "DATABASE_POOL_SIZE")?,
            },
            cache: CacheConfig {
                host: text("REDIS_HOST").unwrap_or_else(default_cache_host),
                port: parse(&lookup, "REDIS_PORT")?.unwrap_or_else(default_cache_port),
                db: parse(&lookup, "REDIS_DB")?.unwrap_or(0),
                password: text("REDIS_PASSWORD"),
                max_connections: parse(&lookup, "REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_cache_max_connections),
            },
            logging: LogConfig {
                dir: text("LOGS_DIRECTORY").map_or_else(default_log_dir, PathBuf::from),
                level: text("LOG_LEVEL").unwrap_or_else(default_log_level),
                json: parse(&lookup, "LOG_JSON")?.unwrap_or(false),
            },
            retry: RetryConfig {
                delay_secs: parse(&lookup, "POOL_RETRY_DELAY_SECS")?
                    .unwrap_or_else(default_retry_delay_secs),
                deadline_secs: parse(&lookup, "POOL_RETRY_DEADLINE_SECS")?,
            },
        })
    }
}

/// Parse an optional variable, rejecting values that do not parse
fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
