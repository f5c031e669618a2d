//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use backoffice_auth::password::PasswordHasher;
use backoffice_auth::{
    AccessGuard, ApiKeyRegistry, PermissionEnforcer, RateLimiter, SessionCleanup,
    SessionController, TokenService,
};
use backoffice_core::clock::SharedClock;
use backoffice_core::config::AppConfig;
use backoffice_core::result::AppResult;
use backoffice_database::Stores;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Time source for every expiry decision
    pub clock: SharedClock,

    // ── Infrastructure ───────────────────────────────────────
    /// Backing stores
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    /// Access and refresh token lifecycle
    pub tokens: Arc<TokenService>,
    /// Login, registration, and password flows
    pub sessions: Arc<SessionController>,
    /// API key registry
    pub api_keys: Arc<ApiKeyRegistry>,
    /// Identity resolution and request metering
    pub guard: Arc<AccessGuard>,
    /// Permission checks for handlers
    pub enforcer: PermissionEnforcer,
}

impl AppState {
    /// Wires every service over `stores`.
    pub fn new(config: AppConfig, stores: Stores, clock: SharedClock) -> AppResult<Self> {
        let auth = &config.auth;

        let hasher = Arc::new(PasswordHasher::new(auth)?);
        let tokens = Arc::new(TokenService::new(
            auth,
            Arc::clone(&stores.users),
            Arc::clone(&stores.refresh_tokens),
            Arc::clone(&clock),
        )?);
        let login_limiter = Arc::new(RateLimiter::new(
            auth.login_attempts_per_window,
            auth.login_window_seconds,
            Arc::clone(&clock),
        ));
        let sessions = Arc::new(SessionController::new(
            auth,
            Arc::clone(&stores.users),
            Arc::clone(&stores.one_time_tokens),
            Arc::clone(&tokens),
            hasher,
            login_limiter,
            Arc::clone(&clock),
        )?);
        let api_keys = Arc::new(ApiKeyRegistry::new(
            Arc::clone(&stores.api_keys),
            Arc::clone(&clock),
        ));

        let request_limiter = if config.rate_limit.enabled {
            RateLimiter::new(
                config.rate_limit.max_requests,
                config.rate_limit.window_seconds,
                Arc::clone(&clock),
            )
        } else {
            RateLimiter::disabled(Arc::clone(&clock))
        };
        let guard = Arc::new(AccessGuard::new(
            Arc::clone(&tokens),
            Arc::clone(&api_keys),
            Arc::new(request_limiter),
        ));

        Ok(Self {
            config: Arc::new(config),
            clock,
            stores,
            tokens,
            sessions,
            api_keys,
            guard,
            enforcer: PermissionEnforcer::new(),
        })
    }

    /// Builds the periodic cleanup task over this state's services.
    pub fn cleanup(&self) -> SessionCleanup {
        SessionCleanup::new(
            Arc::clone(&self.tokens),
            Arc::clone(&self.sessions),
            vec![
                Arc::clone(self.guard.limiter()),
                Arc::clone(self.sessions.login_limiter()),
            ],
        )
    }

    /// Whether responses may carry development-only secrets.
    pub fn is_development(&self) -> bool {
        self.config.is_development()
    }
}
