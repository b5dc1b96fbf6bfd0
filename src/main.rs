//! SupplyHub notification server.
//!
//! Loads configuration, initializes logging, and hands off to the API
//! crate, which wires the store, delivery worker, and HTTP router.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use supplyhub_core::config::AppConfig;
use supplyhub_core::traits::SystemClock;

#[tokio::main]
async fn main() {
    let env = std::env::var("SUPPLYHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.database.backend,
        "Starting SupplyHub notification server"
    );

    if let Err(e) = supplyhub_api::run_server(config, Arc::new(SystemClock)).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
