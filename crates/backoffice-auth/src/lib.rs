//! # backoffice-auth
//!
//! Authentication and authorization for the back-office.
//!
//! ## Modules
//!
//! - `jwt`: HS256 access token encoding and clock-driven validation
//! - `password`: Argon2id hashing and password policy
//! - `token`: access/refresh token issuance, refresh, and revocation
//! - `api_key`: permission-scoped keys for machine clients
//! - `guard`: request identity resolution and fixed-window rate limiting
//! - `rbac`: permission enforcement for resolved identities
//! - `session`: login, registration, password flows, and periodic cleanup

pub mod api_key;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod secret;
pub mod session;
pub mod token;

pub use api_key::ApiKeyRegistry;
pub use guard::{AccessGuard, Identity, RateLimiter};
pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder, TokenRejection};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::PermissionEnforcer;
pub use session::{SessionCleanup, SessionController};
pub use token::TokenService;
