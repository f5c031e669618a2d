//! CLI command definitions and dispatch.

pub mod admin;
pub mod api_key;
pub mod migrate;

use clap::{Parser, Subcommand};

use backoffice_api::AppState;
use backoffice_core::clock::SystemClock;
use backoffice_core::config::AppConfig;
use backoffice_core::config::database::StoreBackend;
use backoffice_core::error::AppError;
use backoffice_database::Stores;

use crate::output::{self, OutputFormat};

/// Back-office auth administration
#[derive(Debug, Parser)]
#[command(name = "backoffice", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects `config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Administrator account management
    Admin(admin::AdminArgs),
    /// API key management
    ApiKey(api_key::ApiKeyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Admin(args) => admin::execute(args, config, self.format).await,
            Commands::ApiKey(args) => api_key::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: build the service graph over the configured stores
pub async fn open_state(config: AppConfig) -> Result<AppState, AppError> {
    if config.database.backend == StoreBackend::Memory {
        output::print_warning("Using in-memory stores; changes are discarded when the command exits.");
    }
    let stores = Stores::from_config(&config).await?;
    AppState::new(config, stores, SystemClock::shared())
}

/// Helper: map a prompt failure
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
