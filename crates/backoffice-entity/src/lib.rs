//! # backoffice-entity
//!
//! Domain entity models for the back-office authentication core. Every
//! struct in this crate represents a stored record or a domain value
//! object. Records with a flat column layout additionally derive
//! `sqlx::FromRow`.

pub mod api_key;
pub mod permission;
pub mod token;
pub mod user;
