//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering. The
//! full setup writes to the console plus two daily rolling files in the log
//! directory: `general.*.log` with every enabled event and `error.*.log`
//! with errors only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use super::retention::{cleanup_old_logs, LOG_RETENTION};
use crate::config::LogConfig;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directives used when `RUST_LOG` is unset (e.g. "info", "debug,sqlx=warn")
    pub filter: String,
    /// Enable JSON output format
    pub json: bool,
    /// Include span events (new, close)
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    /// Include thread names
    pub thread_names: bool,
    /// Include thread IDs
    pub thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
            thread_ids: false,
        }
    }
}

impl TracingConfig {
    /// Create a development configuration with debug logging
    #[must_use]
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            json: false,
            span_events: true,
            file_line: true,
            thread_names: true,
            thread_ids: false,
        }
    }

    /// Create a production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
            span_events: false,
            file_line: false,
            thread_names: false,
            thread_ids: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

impl From<&LogConfig> for TracingConfig {
    fn from(config: &LogConfig) -> Self {
        Self {
            filter: config.level.clone(),
            json: config.json,
            ..Self::default()
        }
    }
}

/// Console layer, pretty or JSON, filtered by `RUST_LOG` or the configured directives
fn console_layer<S>(config: &TracingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_thread_names(config.thread_names)
        .with_thread_ids(config.thread_ids)
        .with_span_events(config.span_events());

    if config.json {
        layer.json().with_filter(config.env_filter()).boxed()
    } else {
        layer.with_filter(config.env_filter()).boxed()
    }
}

/// Try to initialize console-only tracing with default configuration
///
/// Will not panic if called multiple times.
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(&TracingConfig::default())
}

/// Try to initialize console-only tracing with custom configuration
pub fn try_init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(console_layer(config))
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Live logging setup
///
/// Owns the background writers of the log files. Keep it alive for as long
/// as the process logs; dropping it flushes and stops the file writers.
#[derive(Debug)]
pub struct LoggingContext {
    log_dir: PathBuf,
    removed: Vec<PathBuf>,
    _guards: Vec<WorkerGuard>,
}

impl LoggingContext {
    /// Directory holding the log files
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Expired log files deleted during initialization
    pub fn removed_logs(&self) -> &[PathBuf] {
        &self.removed
    }
}

fn daily_file(dir: &Path, prefix: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
}

/// Initialize console and file logging, then prune expired log files
///
/// Creates the log directory when missing. Fails with
/// [`TracingError::AlreadyInitialized`] if a global subscriber is set.
pub fn init_logging(config: &LogConfig) -> Result<LoggingContext, TracingError> {
    let log_dir = config.dir.clone();
    fs::create_dir_all(&log_dir).map_err(|source| TracingError::LogDirectory {
        path: log_dir.clone(),
        source,
    })?;

    let tracing_config = TracingConfig::from(config);
    let (general_writer, general_guard) = tracing_appender::non_blocking(daily_file(&log_dir, "general")?);
    let (error_writer, error_guard) = tracing_appender::non_blocking(daily_file(&log_dir, "error")?);

    let layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![
        console_layer(&tracing_config),
        fmt::layer()
            .with_ansi(false)
            .with_writer(general_writer)
            .with_filter(tracing_config.env_filter())
            .boxed(),
        fmt::layer()
            .with_ansi(false)
            .with_writer(error_writer)
            .with_filter(LevelFilter::ERROR)
            .boxed(),
    ];

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)?;

    let removed = match cleanup_old_logs(&log_dir, LOG_RETENTION, SystemTime::now()) {
        Ok(removed) => removed,
        Err(e) => {
            tracing::warn!(log_dir = %log_dir.display(), error = %e, "Log retention sweep failed");
            Vec::new()
        }
    };

    tracing::info!(
        log_dir = %log_dir.display(),
        removed = removed.len(),
        json = config.json,
        "Logging initialized"
    );

    Ok(LoggingContext {
        log_dir,
        removed,
        _guards: vec![general_guard, error_guard],
    })
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,

    #[error("Cannot create log directory {}: {source}", path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot open log file: {0}")]
    LogFile(#[from] InitError),
}
