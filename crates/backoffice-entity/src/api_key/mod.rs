//! API key domain entities.

pub mod key_type;
pub mod model;

pub use key_type::ApiKeyType;
pub use model::{ApiKey, ApiKeyView, CreateApiKey};
