//! Periodic purge of expired credentials and idle rate-limit windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use backoffice_core::result::AppResult;

use crate::guard::RateLimiter;
use crate::token::TokenService;

use super::controller::SessionController;

/// Counts of records removed by one cleanup cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired or long-revoked refresh tokens deleted.
    pub refresh_tokens: u64,
    /// Expired reset and verification tokens deleted.
    pub one_time_tokens: u64,
    /// Rate-limit windows dropped after going idle.
    pub rate_windows: usize,
}

impl CleanupReport {
    /// Total records removed.
    pub fn total(&self) -> u64 {
        self.refresh_tokens + self.one_time_tokens + self.rate_windows as u64
    }
}

/// Handles periodic cleanup of stale auth state.
#[derive(Clone)]
pub struct SessionCleanup {
    tokens: Arc<TokenService>,
    sessions: Arc<SessionController>,
    limiters: Vec<Arc<RateLimiter>>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("limiters", &self.limiters.len())
            .finish()
    }
}

impl SessionCleanup {
    /// Creates a cleanup handler over the given services and limiters.
    pub fn new(
        tokens: Arc<TokenService>,
        sessions: Arc<SessionController>,
        limiters: Vec<Arc<RateLimiter>>,
    ) -> Self {
        Self {
            tokens,
            sessions,
            limiters,
        }
    }

    /// Runs one cleanup cycle.
    pub async fn run_cleanup(&self) -> AppResult<CleanupReport> {
        let refresh_tokens = self.tokens.purge_expired().await?;
        let one_time_tokens = self.sessions.purge_one_time_tokens().await?;
        let rate_windows = self.limiters.iter().map(|l| l.purge_stale()).sum();

        let report = CleanupReport {
            refresh_tokens,
            one_time_tokens,
            rate_windows,
        };

        if report.total() > 0 {
            info!(
                refresh_tokens = report.refresh_tokens,
                one_time_tokens = report.one_time_tokens,
                rate_windows = report.rate_windows,
                "Auth cleanup completed"
            );
        } else {
            debug!("Auth cleanup found nothing to remove");
        }

        Ok(report)
    }

    /// Spawns a background task that runs [`Self::run_cleanup`] every `interval`.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Auth cleanup failed");
                }
            }
        })
    }
}
