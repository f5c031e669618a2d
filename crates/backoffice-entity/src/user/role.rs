//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::permission::{Permission, PermissionSet};

/// Roles available to back-office users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrator. Only creatable through the CLI.
    Admin,
    /// Regular staff member.
    User,
    /// Read-only visitor.
    Guest,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may be chosen at self-service registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Self::User | Self::Guest)
    }

    /// The permission set a new account of this role receives.
    pub fn default_permissions(&self) -> PermissionSet {
        match self {
            Self::Admin => PermissionSet::all(),
            Self::User => Permission::ALL
                .into_iter()
                .filter(|p| {
                    p.is_read()
                        || matches!(
                            p,
                            Permission::ClientsWrite
                                | Permission::ServicesWrite
                                | Permission::QuotationsWrite
                                | Permission::EmailsSend
                                | Permission::AppointmentsWrite
                        )
                })
                .collect(),
            Self::Guest => Permission::ALL
                .into_iter()
                .filter(|p| p.is_read() && p.is_business())
                .collect(),
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = backoffice_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(backoffice_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, user, guest"
            ))),
        }
    }
}
