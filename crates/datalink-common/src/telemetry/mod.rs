//! Telemetry and tracing setup

mod retention;
mod tracing_setup;

pub use retention::{cleanup_old_logs, LOG_RETENTION};
pub use tracing_setup::{
    init_logging, try_init_tracing, try_init_tracing_with_config, LoggingContext, TracingConfig,
    TracingError,
};
