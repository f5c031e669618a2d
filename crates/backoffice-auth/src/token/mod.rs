//! Access and refresh token lifecycle.

pub mod service;

pub use service::{IssuedRefreshToken, RefreshOutcome, TokenService};
