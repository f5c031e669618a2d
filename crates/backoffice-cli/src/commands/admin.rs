//! Administrator account commands.
//!
//! This is the only path that creates `admin` users; self-service
//! registration refuses the role.

use clap::{Args, Subcommand};

use backoffice_core::config::AppConfig;
use backoffice_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new admin user
    Create {
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Execute admin commands
pub async fn execute(
    args: &AdminArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::open_state(config).await?;

    match &args.command {
        AdminCommand::Create {
            email,
            name,
            password,
        } => {
            let email = match email {
                Some(e) => e.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Admin email")
                    .interact_text()
                    .map_err(super::input_error)?,
            };

            let name = match name {
                Some(n) => n.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Display name")
                    .default("Administrator".to_string())
                    .interact_text()
                    .map_err(super::input_error)?,
            };

            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Admin password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .map_err(super::input_error)?,
            };

            let user = state
                .sessions
                .bootstrap_admin(&email, &password, &name)
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&user),
                OutputFormat::Table => {
                    output::print_success(&format!("Admin user '{}' created", user.email));
                    output::print_kv("ID", &user.id.to_string());
                    output::print_kv("Permissions", &user.permissions.to_strings().join(", "));
                }
            }
        }
    }

    Ok(())
}
