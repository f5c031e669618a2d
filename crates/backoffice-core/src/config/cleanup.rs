//! Background cleanup configuration.

use serde::{Deserialize, Serialize};

/// Periodic purge of expired tokens and stale rate windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Whether the cleanup task runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between sweeps in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    300
}
