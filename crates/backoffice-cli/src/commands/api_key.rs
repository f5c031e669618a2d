//! API key management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use backoffice_core::config::AppConfig;
use backoffice_core::error::{AppError, codes};
use backoffice_entity::api_key::{ApiKey, ApiKeyType};

use crate::output::{self, OutputFormat};

/// Arguments for api-key commands
#[derive(Debug, Args)]
pub struct ApiKeyArgs {
    /// API key subcommand
    #[command(subcommand)]
    pub command: ApiKeyCommand,
}

/// API key subcommands
#[derive(Debug, Subcommand)]
pub enum ApiKeyCommand {
    /// Create a key from a preset type or an explicit permission list
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Preset type: admin, service, read_only, webhook
        #[arg(short = 't', long = "type", conflicts_with = "permissions")]
        key_type: Option<String>,
        /// Comma-separated permissions (creates a custom key)
        #[arg(short, long, value_delimiter = ',')]
        permissions: Vec<String>,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List all keys
    List,
    /// Re-activate a key
    Activate {
        /// The key secret
        key: String,
    },
    /// Deactivate a key
    Deactivate {
        /// The key secret
        key: String,
    },
    /// Show aggregate statistics
    Stats,
}

/// API key display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ApiKeyRow {
    /// Key ID
    id: String,
    /// Display prefix
    prefix: String,
    /// Name
    name: String,
    /// Type
    #[tabled(rename = "type")]
    key_type: String,
    /// Permission count
    permissions: usize,
    /// Status
    status: &'static str,
    /// Created at
    created_at: String,
    /// Last used at
    last_used_at: String,
}

impl From<&ApiKey> for ApiKeyRow {
    fn from(k: &ApiKey) -> Self {
        Self {
            id: k.id.to_string(),
            prefix: k.prefix.clone(),
            name: k.name.clone(),
            key_type: k.key_type.to_string(),
            permissions: k.permissions.len(),
            status: if k.is_active { "active" } else { "inactive" },
            created_at: k.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_used_at: k
                .last_used_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

/// Execute api-key commands
pub async fn execute(
    args: &ApiKeyArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::open_state(config).await?;
    let registry = &state.api_keys;

    match &args.command {
        ApiKeyCommand::Create {
            name,
            key_type,
            permissions,
            description,
        } => {
            let created = match key_type {
                Some(raw) => {
                    let key_type = raw.parse::<ApiKeyType>()?;
                    registry
                        .create_api_key(key_type, name, description.as_deref())
                        .await?
                }
                None if permissions.is_empty() => {
                    return Err(AppError::validation(
                        "Give --type or at least one --permissions entry",
                    )
                    .with_code(codes::INVALID_PERMISSIONS));
                }
                None => {
                    registry
                        .create_custom_api_key(name, permissions, description.as_deref())
                        .await?
                }
            };

            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "key": created.secret,
                    "apiKey": created.key.view(),
                })),
                OutputFormat::Table => {
                    output::print_success(&format!("API key '{}' created", created.key.name));
                    output::print_kv("Key", &created.secret);
                    output::print_kv("Type", created.key.key_type.as_str());
                    output::print_kv(
                        "Permissions",
                        &created.key.permissions.to_strings().join(", "),
                    );
                    output::print_warning("Store this key securely. It will not be shown again.");
                }
            }
        }
        ApiKeyCommand::List => {
            let keys = registry.list_api_keys().await?;
            let rows: Vec<ApiKeyRow> = keys.iter().map(ApiKeyRow::from).collect();
            output::print_rows(&rows, format, "No API keys.");
        }
        ApiKeyCommand::Activate { key } => {
            if !registry.activate_api_key(key).await? {
                return Err(not_found());
            }
            output::print_success("API key activated");
        }
        ApiKeyCommand::Deactivate { key } => {
            if !registry.deactivate_api_key(key).await? {
                return Err(not_found());
            }
            output::print_success("API key deactivated");
        }
        ApiKeyCommand::Stats => {
            let stats = registry.get_stats().await?;
            match format {
                OutputFormat::Json => output::print_json(&stats),
                OutputFormat::Table => {
                    output::print_kv("Total", &stats.total.to_string());
                    output::print_kv("Active", &stats.active.to_string());
                    output::print_kv("Inactive", &stats.inactive.to_string());
                    for (key_type, count) in &stats.by_type {
                        output::print_kv(&format!("type {key_type}"), &count.to_string());
                    }
                    for (permission, count) in &stats.by_permission {
                        output::print_kv(&format!("grant {permission}"), &count.to_string());
                    }
                }
            }
        }
    }

    Ok(())
}

fn not_found() -> AppError {
    AppError::not_found("API key not found").with_code(codes::API_KEY_NOT_FOUND)
}
