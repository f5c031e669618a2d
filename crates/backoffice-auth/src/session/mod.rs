//! Session flows and periodic cleanup.

pub mod cleanup;
pub mod controller;

pub use cleanup::{CleanupReport, SessionCleanup};
pub use controller::{
    LoginResult, RegisterInput, RegisterResult, SessionController, ValidationResult,
};
