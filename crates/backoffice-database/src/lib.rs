//! # backoffice-database
//!
//! Persistence for users, refresh tokens, one-time tokens, and API keys.
//! Each record family is accessed through an async store trait with two
//! implementations: process-local in-memory stores (development and tests)
//! and PostgreSQL repositories built on sqlx.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod provider;
pub mod store;

pub use connection::DatabasePool;
pub use provider::Stores;
pub use store::{ApiKeyStore, OneTimeTokenStore, RefreshTokenStore, UserStore};
