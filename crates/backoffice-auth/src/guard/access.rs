//! Credential resolution for incoming requests.

use std::sync::Arc;

use tracing::debug;

use backoffice_core::result::AppResult;

use super::identity::Identity;
use super::rate_limit::{RateDecision, RateLimiter};
use crate::api_key::ApiKeyRegistry;
use crate::token::TokenService;

/// Resolves request credentials into an [`Identity`] and meters requests.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
    api_keys: Arc<ApiKeyRegistry>,
    limiter: Arc<RateLimiter>,
}

impl AccessGuard {
    /// Creates a guard.
    pub fn new(
        tokens: Arc<TokenService>,
        api_keys: Arc<ApiKeyRegistry>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            tokens,
            api_keys,
            limiter,
        }
    }

    /// Resolves credentials in priority order: bearer token, then API key,
    /// then anonymous.
    ///
    /// A bearer token that fails validation yields `Anonymous`; the API key
    /// header is not consulted in that case.
    pub async fn resolve(
        &self,
        bearer: Option<&str>,
        api_key: Option<&str>,
    ) -> AppResult<Identity> {
        if let Some(token) = bearer {
            return Ok(match self.tokens.validate_access_token(token) {
                Ok(claims) => Identity::User(claims),
                Err(rejection) => {
                    debug!(reason = rejection.reason(), "Bearer token rejected");
                    Identity::Anonymous
                }
            });
        }

        if let Some(secret) = api_key {
            return Ok(match self.api_keys.authenticate(secret).await? {
                Some(key) => Identity::ApiKey(key),
                None => Identity::Anonymous,
            });
        }

        Ok(Identity::Anonymous)
    }

    /// Counts one request for `identity`.
    pub fn check_rate(&self, identity: &Identity, client_ip: &str) -> RateDecision {
        self.limiter.check(&identity.rate_limit_key(client_ip))
    }

    /// The underlying limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use uuid::Uuid;

    use backoffice_core::clock::ManualClock;
    use backoffice_core::config::auth::AuthConfig;
    use backoffice_database::memory::{
        MemoryApiKeyStore, MemoryRefreshTokenStore, MemoryUserStore,
    };
    use backoffice_entity::api_key::ApiKeyType;
    use backoffice_entity::user::UserRole;

    use crate::jwt::AccessTokenSubject;

    fn guard() -> (AccessGuard, Arc<TokenService>, Arc<ApiKeyRegistry>, ManualClock) {
        let clock = ManualClock::starting_now();
        let shared: backoffice_core::SharedClock = Arc::new(clock.clone());
        let tokens = Arc::new(TokenService::new(
            &AuthConfig::default(),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryRefreshTokenStore::new()),
            shared.clone(),
        )
        .unwrap());
        let keys = Arc::new(ApiKeyRegistry::new(
            Arc::new(MemoryApiKeyStore::new()),
            shared.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(100, 900, shared));
        (
            AccessGuard::new(tokens.clone(), keys.clone(), limiter),
            tokens,
            keys,
            clock,
        )
    }

    fn subject() -> AccessTokenSubject {
        AccessTokenSubject {
            user_id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            role: UserRole::Admin,
            permissions: UserRole::Admin.default_permissions(),
        }
    }

    #[tokio::test]
    async fn test_bearer_wins_over_api_key() {
        let (guard, tokens, keys, _) = guard();
        let access = tokens.issue_access_token(&subject()).unwrap();
        let key = keys
            .create_api_key(ApiKeyType::ReadOnly, "r", None)
            .await
            .unwrap();

        let identity = guard
            .resolve(Some(&access.token), Some(&key.secret))
            .await
            .unwrap();
        assert!(matches!(identity, Identity::User(_)));
    }

    #[tokio::test]
    async fn test_invalid_bearer_does_not_fall_through() {
        let (guard, tokens, keys, clock) = guard();
        let access = tokens.issue_access_token(&subject()).unwrap();
        let key = keys
            .create_api_key(ApiKeyType::ReadOnly, "r", None)
            .await
            .unwrap();
        clock.advance(Duration::minutes(16));

        let identity = guard
            .resolve(Some(&access.token), Some(&key.secret))
            .await
            .unwrap();
        assert!(matches!(identity, Identity::Anonymous));
    }

    #[tokio::test]
    async fn test_api_key_and_anonymous() {
        let (guard, _, keys, _) = guard();
        let key = keys
            .create_api_key(ApiKeyType::Webhook, "w", None)
            .await
            .unwrap();

        let identity = guard.resolve(None, Some(&key.secret)).await.unwrap();
        assert_eq!(identity.rate_limit_key("1.1.1.1"), format!("api_key:{}", key.key.id));

        let identity = guard.resolve(None, Some("bo_wrong")).await.unwrap();
        assert!(!identity.is_authenticated());
        assert_eq!(identity.rate_limit_key("1.1.1.1"), "ip:1.1.1.1");

        let identity = guard.resolve(None, None).await.unwrap();
        assert!(matches!(identity, Identity::Anonymous));
    }
}
