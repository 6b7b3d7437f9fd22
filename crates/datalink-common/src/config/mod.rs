//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, LogConfig, RetryConfig,
};
