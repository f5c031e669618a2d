//! The closed permission enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use backoffice_core::AppError;

/// A single capability that users and API keys may hold.
///
/// The wire form is `<resource>:<action>`, e.g. `clients:read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Read client records.
    #[serde(rename = "clients:read")]
    ClientsRead,
    /// Create and edit client records.
    #[serde(rename = "clients:write")]
    ClientsWrite,
    /// Read the service catalog.
    #[serde(rename = "services:read")]
    ServicesRead,
    /// Edit the service catalog.
    #[serde(rename = "services:write")]
    ServicesWrite,
    /// Read quotations.
    #[serde(rename = "quotations:read")]
    QuotationsRead,
    /// Create and edit quotations.
    #[serde(rename = "quotations:write")]
    QuotationsWrite,
    /// Read the email inbox.
    #[serde(rename = "emails:read")]
    EmailsRead,
    /// Send outbound email.
    #[serde(rename = "emails:send")]
    EmailsSend,
    /// Read appointments.
    #[serde(rename = "appointments:read")]
    AppointmentsRead,
    /// Create and edit appointments.
    #[serde(rename = "appointments:write")]
    AppointmentsWrite,
    /// Read user profiles.
    #[serde(rename = "users:read")]
    UsersRead,
    /// Administer users.
    #[serde(rename = "users:manage")]
    UsersManage,
    /// Create, list, and toggle API keys.
    #[serde(rename = "api_keys:manage")]
    ApiKeysManage,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 13] = [
        Self::ClientsRead,
        Self::ClientsWrite,
        Self::ServicesRead,
        Self::ServicesWrite,
        Self::QuotationsRead,
        Self::QuotationsWrite,
        Self::EmailsRead,
        Self::EmailsSend,
        Self::AppointmentsRead,
        Self::AppointmentsWrite,
        Self::UsersRead,
        Self::UsersManage,
        Self::ApiKeysManage,
    ];

    /// Return the wire form of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientsRead => "clients:read",
            Self::ClientsWrite => "clients:write",
            Self::ServicesRead => "services:read",
            Self::ServicesWrite => "services:write",
            Self::QuotationsRead => "quotations:read",
            Self::QuotationsWrite => "quotations:write",
            Self::EmailsRead => "emails:read",
            Self::EmailsSend => "emails:send",
            Self::AppointmentsRead => "appointments:read",
            Self::AppointmentsWrite => "appointments:write",
            Self::UsersRead => "users:read",
            Self::UsersManage => "users:manage",
            Self::ApiKeysManage => "api_keys:manage",
        }
    }

    /// Short human description, shown in the permissions catalog.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClientsRead => "View clients",
            Self::ClientsWrite => "Create and edit clients",
            Self::ServicesRead => "View the service catalog",
            Self::ServicesWrite => "Edit the service catalog",
            Self::QuotationsRead => "View quotations",
            Self::QuotationsWrite => "Create and edit quotations",
            Self::EmailsRead => "Read the email inbox",
            Self::EmailsSend => "Send email",
            Self::AppointmentsRead => "View appointments",
            Self::AppointmentsWrite => "Create and edit appointments",
            Self::UsersRead => "View users",
            Self::UsersManage => "Manage users",
            Self::ApiKeysManage => "Manage API keys",
        }
    }

    /// Whether this is a read-only capability.
    pub fn is_read(&self) -> bool {
        self.as_str().ends_with(":read")
    }

    /// Whether this permission belongs to the business modules rather
    /// than user or key administration.
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            Self::UsersRead | Self::UsersManage | Self::ApiKeysManage
        )
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| AppError::validation(format!("Unknown permission: '{s}'")))
    }
}
