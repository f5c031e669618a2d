//! API key registry for non-interactive clients.

pub mod catalog;
pub mod registry;

pub use catalog::{KeyTypeEntry, PermissionEntry, PermissionsCatalog};
pub use registry::{ApiKeyRegistry, ApiKeyStats, CreatedApiKey, SECRET_PREFIX};
