//! # datalink-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, LogConfig, RetryConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    cleanup_old_logs, init_logging, try_init_tracing, try_init_tracing_with_config,
    LoggingContext, TracingConfig, TracingError, LOG_RETENTION,
};
