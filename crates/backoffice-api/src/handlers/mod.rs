//! HTTP request handlers organized by domain.

pub mod api_keys;
pub mod auth;
pub mod health;
