//! Response DTOs.

use serde::Serialize;
use uuid::Uuid;

use backoffice_auth::AccessClaims;
use backoffice_auth::api_key::ApiKeyStats;
use backoffice_entity::api_key::ApiKeyView;
use backoffice_entity::permission::PermissionSet;
use backoffice_entity::user::{UserRole, UserView};

/// Standard success envelope. The payload's fields sit next to `success`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`.
    pub success: bool,
    /// Response payload.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl ApiResponse<Empty> {
    /// A bare `{ "success": true }`.
    pub fn empty() -> Self {
        Self::ok(Empty {})
    }
}

/// No payload.
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

/// A human-readable acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Session lifetime in seconds (refresh token TTL).
    pub expires_in: i64,
    /// Access token lifetime in seconds.
    pub access_expires_in: i64,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// The signed-in user.
    pub user: UserView,
}

/// Refresh response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Replacement refresh token when rotation is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Registration response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// The created user.
    pub user: UserView,
    /// Email verification token; development mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
}

/// Current user response.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// The user.
    pub user: UserView,
}

/// Password reset request acknowledgement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestResponse {
    /// Generic message, identical whether or not the email exists.
    pub message: String,
    /// Reset token; development mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

/// Identity carried by a valid access token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenUser {
    /// User ID.
    pub id: Uuid,
    /// Email at issuance.
    pub email: String,
    /// Role at issuance.
    pub role: UserRole,
    /// Permissions at issuance.
    pub permissions: PermissionSet,
}

impl From<AccessClaims> for TokenUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
        }
    }
}

/// Stateless token validation response.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    /// Whether the token is valid now.
    pub valid: bool,
    /// The token's identity when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<TokenUser>,
    /// Rejection reason when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// A newly created API key. The secret appears here and nowhere else.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKeyResponse {
    /// The plaintext secret.
    pub key: String,
    /// Stored metadata.
    pub api_key: ApiKeyView,
    /// Reminder that the secret is shown once.
    pub warning: &'static str,
}

/// API key listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyListResponse {
    /// Key metadata, newest first.
    pub api_keys: Vec<ApiKeyView>,
    /// Number of keys.
    pub count: usize,
}

/// Single API key metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    /// Key metadata.
    pub api_key: ApiKeyView,
}

/// API key statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyStatsResponse {
    /// Aggregates.
    pub stats: ApiKeyStats,
}

/// Liveness probe response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Whether the backing store answered.
    pub database: bool,
}
