//! Database migration management commands.

use clap::{Args, Subcommand};

use backoffice_core::config::AppConfig;
use backoffice_core::config::database::StoreBackend;
use backoffice_core::error::AppError;
use backoffice_database::DatabasePool;
use backoffice_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.database.backend != StoreBackend::Postgres {
        return Err(AppError::configuration(
            "Migrations require database.backend = \"postgres\"",
        ));
    }

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            pool.close().await;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
