//! Custom Axum extractors.

pub mod identity;
pub mod json;

pub use identity::{ApiKeyPrincipal, AuthUser, Authenticated, CurrentIdentity};
pub use json::ValidatedJson;
