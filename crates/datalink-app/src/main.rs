//! datalink entry point
//!
//! Run with:
//! ```bash
//! cargo run -p datalink-app
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use datalink_common::{init_logging, try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Held until exit so the file writers flush
    let logging = match init_logging(&config.logging) {
        Ok(context) => Some(context),
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "File logging unavailable, logging to console only");
            None
        }
    };

    info!(database = ?config.database, cache = ?config.cache, "Configuration loaded");

    if let Err(e) = datalink_app::run(config).await {
        error!(error = %e, "Startup failed");
        drop(logging);
        std::process::exit(1);
    }
}
