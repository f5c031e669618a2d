//! # backoffice-api
//!
//! HTTP API layer for the back-office auth core, built on Axum.
//!
//! Provides the session and API-key endpoints, the access guard middleware
//! (identity resolution and rate limiting), request logging, CORS,
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
