//! The caller identity attached to each request.

use uuid::Uuid;

use backoffice_entity::api_key::ApiKey;
use backoffice_entity::permission::{Permission, PermissionSet};

use crate::jwt::AccessClaims;

/// Who is making a request.
#[derive(Debug, Clone)]
pub enum Identity {
    /// A user presenting a valid access token.
    User(AccessClaims),
    /// A machine client presenting an active API key.
    ApiKey(ApiKey),
    /// No credentials, or credentials that did not validate.
    Anonymous,
}

impl Identity {
    /// Whether any credential was accepted.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Permissions held by the identity, if authenticated.
    pub fn permissions(&self) -> Option<&PermissionSet> {
        match self {
            Self::User(claims) => Some(&claims.permissions),
            Self::ApiKey(key) => Some(&key.permissions),
            Self::Anonymous => None,
        }
    }

    /// Whether the identity holds `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().is_some_and(|p| p.contains(permission))
    }

    /// The authenticated user's ID, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(claims) => Some(claims.sub),
            _ => None,
        }
    }

    /// Rate-limit bucket for this identity. Anonymous callers are bucketed
    /// by client address.
    pub fn rate_limit_key(&self, client_ip: &str) -> String {
        match self {
            Self::User(claims) => format!("user:{}", claims.sub),
            Self::ApiKey(key) => format!("api_key:{}", key.id),
            Self::Anonymous => format!("ip:{client_ip}"),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::ApiKey(_) => "api_key",
            Self::Anonymous => "anonymous",
        }
    }
}
