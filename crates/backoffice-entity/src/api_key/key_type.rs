//! API key type presets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::permission::{Permission, PermissionSet};

/// The preset an API key was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "api_key_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyType {
    /// Every permission.
    Admin,
    /// Business read and write, no user or key administration.
    Service,
    /// Business reads only.
    ReadOnly,
    /// Inbound webhook integrations.
    Webhook,
    /// Caller-chosen permission set.
    Custom,
}

impl ApiKeyType {
    /// Every key type, in declaration order.
    pub const ALL: [ApiKeyType; 5] = [
        Self::Admin,
        Self::Service,
        Self::ReadOnly,
        Self::Webhook,
        Self::Custom,
    ];

    /// The preset permission set. `Custom` has none of its own.
    pub fn preset_permissions(&self) -> PermissionSet {
        match self {
            Self::Admin => PermissionSet::all(),
            Self::Service => Permission::ALL
                .into_iter()
                .filter(Permission::is_business)
                .collect(),
            Self::ReadOnly => Permission::ALL
                .into_iter()
                .filter(|p| p.is_business() && p.is_read())
                .collect(),
            Self::Webhook => [
                Permission::EmailsRead,
                Permission::AppointmentsRead,
                Permission::AppointmentsWrite,
            ]
            .into_iter()
            .collect(),
            Self::Custom => PermissionSet::new(),
        }
    }

    /// Short human description, shown in the permissions catalog.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Admin => "Full access to every resource",
            Self::Service => "Business read/write without user or key administration",
            Self::ReadOnly => "Read-only access to business resources",
            Self::Webhook => "Inbound webhooks for email and appointments",
            Self::Custom => "Caller-supplied permission set",
        }
    }

    /// Return the key type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Service => "service",
            Self::ReadOnly => "read_only",
            Self::Webhook => "webhook",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ApiKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKeyType {
    type Err = backoffice_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Self::Admin),
            "service" => Ok(Self::Service),
            "read_only" | "readonly" => Ok(Self::ReadOnly),
            "webhook" => Ok(Self::Webhook),
            "custom" => Ok(Self::Custom),
            _ => Err(backoffice_core::AppError::validation(format!(
                "Invalid API key type: '{s}'. Expected one of: admin, service, read_only, webhook, custom"
            ))),
        }
    }
}
