//! Checks whether a resolved identity holds a capability.

use backoffice_core::error::AppError;
use backoffice_entity::permission::Permission;

use crate::guard::Identity;

/// Enforces permission requirements on resolved identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEnforcer;

impl PermissionEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Requires an authenticated identity.
    ///
    /// Anonymous callers get `NOT_AUTHENTICATED` (401).
    pub fn require_authenticated(&self, identity: &Identity) -> Result<(), AppError> {
        if identity.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::not_authenticated())
        }
    }

    /// Requires `permission`.
    ///
    /// Anonymous callers get `NOT_AUTHENTICATED` (401); authenticated callers
    /// lacking the permission get `INSUFFICIENT_PERMISSIONS` (403).
    pub fn require_permission(
        &self,
        identity: &Identity,
        permission: Permission,
    ) -> Result<(), AppError> {
        self.require_authenticated(identity)?;
        if identity.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Missing required permission '{permission}'"
            ))
            .with_details(serde_json::json!({ "required": permission })))
        }
    }

    /// Requires every permission in `permissions`.
    pub fn require_all(
        &self,
        identity: &Identity,
        permissions: &[Permission],
    ) -> Result<(), AppError> {
        permissions
            .iter()
            .try_for_each(|p| self.require_permission(identity, *p))
    }
}
