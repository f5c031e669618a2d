//! Back-office auth server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use backoffice_api::AppState;
use backoffice_core::clock::SystemClock;
use backoffice_core::config::AppConfig;
use backoffice_core::config::logging::LogFormat;
use backoffice_core::error::AppError;
use backoffice_database::Stores;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `BACKOFFICE_ENV`
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BACKOFFICE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        environment = %config.server.environment,
        backend = ?config.database.backend,
        "Starting back-office auth v{}",
        env!("CARGO_PKG_VERSION")
    );

    let stores = Stores::from_config(&config).await?;
    let state = AppState::new(config, stores, SystemClock::shared())?;

    let cleanup = if state.config.cleanup.enabled {
        let interval = Duration::from_secs(state.config.cleanup.interval_seconds);
        tracing::info!(interval_secs = interval.as_secs(), "Starting auth cleanup task");
        Some(state.cleanup().spawn(interval))
    } else {
        None
    };

    let pool = state.stores.pool.clone();
    let result = backoffice_api::run_server(state).await;

    if let Some(handle) = cleanup {
        handle.abort();
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    result
}
