//! Stored token records.

pub mod one_time;
pub mod refresh;

pub use one_time::{OneTimeToken, TokenPurpose};
pub use refresh::{ClientMetadata, RefreshToken};
