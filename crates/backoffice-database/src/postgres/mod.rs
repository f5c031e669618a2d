//! PostgreSQL store implementations.

pub mod api_key;
pub mod one_time;
pub mod refresh_token;
pub mod user;

pub use api_key::PgApiKeyStore;
pub use one_time::PgOneTimeTokenStore;
pub use refresh_token::PgRefreshTokenStore;
pub use user::PgUserStore;

use backoffice_core::{AppError, ErrorKind};
use backoffice_entity::permission::PermissionSet;

/// Decode a `TEXT[]` permissions column.
///
/// Unknown entries mean the table was written by something other than this
/// crate and are reported as a database fault.
pub(crate) fn decode_permissions(raw: &[String]) -> Result<PermissionSet, AppError> {
    PermissionSet::parse(raw).map_err(|invalid| {
        AppError::new(
            ErrorKind::Database,
            format!("Stored permission set contains unknown entries: {invalid:?}"),
        )
    })
}
