//! Request-time identity resolution and rate limiting.

pub mod access;
pub mod identity;
pub mod rate_limit;

pub use access::AccessGuard;
pub use identity::Identity;
pub use rate_limit::{RateDecision, RateLimiter, WindowState};
