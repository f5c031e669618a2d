//! # backoffice-core
//!
//! Core crate for the back-office authentication service. Contains the
//! configuration schemas, the unified error system, and the injectable
//! clock used for every expiry decision.
//!
//! This crate has **no** internal dependencies on other back-office crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
