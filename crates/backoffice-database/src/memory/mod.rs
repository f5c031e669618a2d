//! Process-local store implementations.
//!
//! State lives for the lifetime of the process and is not shared between
//! instances. Used for development and by the test suites.

pub mod api_key;
pub mod one_time;
pub mod refresh_token;
pub mod user;

pub use api_key::MemoryApiKeyStore;
pub use one_time::MemoryOneTimeTokenStore;
pub use refresh_token::MemoryRefreshTokenStore;
pub use user::MemoryUserStore;
