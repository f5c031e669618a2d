//! Session controller: login, registration, refresh, logout, and password
//! flows composed from the credential store and the token service.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use backoffice_core::clock::SharedClock;
use backoffice_core::config::auth::AuthConfig;
use backoffice_core::error::{AppError, codes};
use backoffice_core::result::AppResult;
use backoffice_database::store::{OneTimeTokenStore, UserStore};
use backoffice_entity::token::{ClientMetadata, OneTimeToken, TokenPurpose};
use backoffice_entity::user::{CreateUser, UserRole, UserView, normalize_email};

use crate::guard::RateLimiter;
use crate::jwt::{AccessClaims, AccessTokenSubject, IssuedAccessToken};
use crate::password::{PasswordHasher, PasswordValidator};
use crate::secret::{generate_token, hash_token};
use crate::token::{IssuedRefreshToken, RefreshOutcome, TokenService};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Short-lived access token.
    pub access: IssuedAccessToken,
    /// Refresh token bound to the session.
    pub refresh: IssuedRefreshToken,
    /// The signed-in user.
    pub user: UserView,
}

/// Self-service registration input.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Requested role; `user` when absent.
    pub role: Option<String>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterResult {
    /// The created user.
    pub user: UserView,
    /// Email verification token, to be delivered out of band.
    pub verification_token: String,
}

/// Result of a stateless access token check.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the token is currently valid.
    pub valid: bool,
    /// The token's claims when valid.
    pub claims: Option<AccessClaims>,
    /// Rejection reason when invalid.
    pub reason: Option<&'static str>,
}

/// Orchestrates the session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionController {
    users: Arc<dyn UserStore>,
    one_time_tokens: Arc<dyn OneTimeTokenStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    login_limiter: Arc<RateLimiter>,
    clock: SharedClock,
    reset_ttl: Duration,
    verification_ttl: Duration,
}

impl SessionController {
    /// Creates a session controller with all required dependencies.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        one_time_tokens: Arc<dyn OneTimeTokenStore>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
        login_limiter: Arc<RateLimiter>,
        clock: SharedClock,
    ) -> AppResult<Self> {
        Ok(Self {
            users,
            one_time_tokens,
            tokens,
            hasher,
            validator: PasswordValidator::new(config),
            login_limiter,
            clock,
            reset_ttl: config.reset_token_ttl()?,
            verification_ttl: config.verification_token_ttl()?,
        })
    }

    /// The token service this controller issues through.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// The per-email login attempt limiter.
    pub fn login_limiter(&self) -> &Arc<RateLimiter> {
        &self.login_limiter
    }

    /// Authenticates by email and password and issues a token pair.
    ///
    /// Unknown email and wrong password fail identically with
    /// `INVALID_CREDENTIALS`. A disabled account is reported only once the
    /// password has verified.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
        client: &ClientMetadata,
    ) -> AppResult<LoginResult> {
        let email = normalize_email(email);
        let attempt_key = format!("login:{email}");
        let decision = self.login_limiter.check(&attempt_key);
        if !decision.allowed {
            warn!(email = %email, "Login attempts exhausted");
            return Err(AppError::rate_limited("Too many login attempts")
                .with_code(codes::TOO_MANY_ATTEMPTS)
                .with_details(serde_json::json!({
                    "retryAfter": decision.retry_after_secs
                })));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.hasher.verify_dummy(password);
            warn!(reason = "unknown_email", "Login failed");
            return Err(invalid_credentials());
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, reason = "wrong_password", "Login failed");
            return Err(invalid_credentials());
        }

        if !user.is_active {
            warn!(user_id = %user.id, reason = "account_disabled", "Login failed");
            return Err(AppError::authorization("Account is disabled")
                .with_code(codes::ACCOUNT_DISABLED));
        }

        self.login_limiter.reset(&attempt_key);
        self.users.record_login(user.id, self.clock.now()).await?;

        let access = self
            .tokens
            .issue_access_token(&AccessTokenSubject::from(&user))?;
        let refresh = self
            .tokens
            .issue_refresh_token(user.id, client, remember_me)
            .await?;

        info!(user_id = %user.id, remember_me, "User logged in");
        Ok(LoginResult {
            access,
            refresh,
            user: user.view(),
        })
    }

    /// Creates an active, unverified account with a self-service role.
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResult> {
        let email = normalize_email(&input.email);
        if !email.as_str().validate_email() {
            return Err(AppError::validation("Invalid email address"));
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }

        let role = match input.role.as_deref() {
            None => UserRole::User,
            Some(raw) => match raw.parse::<UserRole>() {
                Ok(role) if role.is_self_assignable() => role,
                _ => {
                    return Err(AppError::validation(format!(
                        "Role '{raw}' cannot be chosen at registration"
                    ))
                    .with_code(codes::ROLE_NOT_ALLOWED)
                    .with_details(serde_json::json!({ "allowed": ["user", "guest"] })));
                }
            },
        };

        self.validator.validate(&input.password)?;
        let password_hash = self.hasher.hash_password(&input.password)?;

        let user = self
            .users
            .create(
                CreateUser {
                    email,
                    password_hash,
                    name: name.to_string(),
                    role,
                    permissions: role.default_permissions(),
                    email_verified: false,
                },
                self.clock.now(),
            )
            .await?;

        let verification_token = self
            .mint_one_time_token(user.id, TokenPurpose::EmailVerification)
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(RegisterResult {
            user: user.view(),
            verification_token,
        })
    }

    /// Creates an administrator account. Only reachable from the operator
    /// CLI; self-service registration never yields admins.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppResult<UserView> {
        let email = normalize_email(email);
        if !email.as_str().validate_email() {
            return Err(AppError::validation("Invalid email address"));
        }
        self.validator.validate(password)?;
        let password_hash = self.hasher.hash_password(password)?;

        let user = self
            .users
            .create(
                CreateUser {
                    email,
                    password_hash,
                    name: name.trim().to_string(),
                    role: UserRole::Admin,
                    permissions: UserRole::Admin.default_permissions(),
                    email_verified: true,
                },
                self.clock.now(),
            )
            .await?;

        info!(user_id = %user.id, "Administrator created");
        Ok(user.view())
    }

    /// Mints a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshOutcome> {
        self.tokens
            .refresh_access_token(refresh_token)
            .await?
            .ok_or_else(|| {
                AppError::authentication("Refresh token is invalid or expired")
                    .with_code(codes::INVALID_REFRESH_TOKEN)
            })
    }

    /// Ends every session of the user. Returns the number of refresh
    /// tokens revoked.
    pub async fn logout(&self, user_id: Uuid) -> AppResult<u64> {
        self.tokens.revoke_all_user_tokens(user_id).await
    }

    /// The current user view.
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserView> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.view())
            .ok_or_else(AppError::not_authenticated)
    }

    /// Mints a reset token when the email is registered.
    ///
    /// Callers must answer identically whether or not a token was minted.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<Option<String>> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            info!(reason = "unknown_email", "Password reset requested");
            return Ok(None);
        };
        let token = self
            .mint_one_time_token(user.id, TokenPurpose::PasswordReset)
            .await?;
        info!(user_id = %user.id, "Password reset requested");
        Ok(Some(token))
    }

    /// Sets a new password using a reset token. Each token works once.
    /// Every refresh token of the user is revoked.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        self.validator.validate(new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;

        let record = self
            .consume_one_time_token(token, TokenPurpose::PasswordReset)
            .await?;
        if !self
            .users
            .update_password(record.user_id, &password_hash, self.clock.now())
            .await?
        {
            return Err(invalid_token());
        }
        self.tokens.revoke_all_user_tokens(record.user_id).await?;

        info!(user_id = %record.user_id, "Password reset completed");
        Ok(())
    }

    /// Changes the password after verifying the current one. Every refresh
    /// token of the user is revoked.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(AppError::not_authenticated)?;

        if !self
            .hasher
            .verify_password(current_password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Password change with wrong current password");
            return Err(AppError::validation("Current password is incorrect")
                .with_code(codes::WRONG_PASSWORD));
        }

        self.validator.validate(new_password)?;
        self.validator
            .validate_not_same(current_password, new_password)?;

        let password_hash = self.hasher.hash_password(new_password)?;
        if !self
            .users
            .update_password(user.id, &password_hash, self.clock.now())
            .await?
        {
            return Err(AppError::not_authenticated());
        }
        self.tokens.revoke_all_user_tokens(user.id).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Marks the email verified using a verification token.
    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        let record = self
            .consume_one_time_token(token, TokenPurpose::EmailVerification)
            .await?;
        if !self
            .users
            .mark_email_verified(record.user_id, self.clock.now())
            .await?
        {
            return Err(invalid_token());
        }
        info!(user_id = %record.user_id, "Email verified");
        Ok(())
    }

    /// Stateless access token check.
    pub fn validate(&self, token: &str) -> ValidationResult {
        match self.tokens.validate_access_token(token) {
            Ok(claims) => ValidationResult {
                valid: true,
                claims: Some(claims),
                reason: None,
            },
            Err(rejection) => ValidationResult {
                valid: false,
                claims: None,
                reason: Some(rejection.reason()),
            },
        }
    }

    /// Deletes expired one-time tokens.
    pub async fn purge_one_time_tokens(&self) -> AppResult<u64> {
        self.one_time_tokens.purge_expired(self.clock.now()).await
    }

    async fn mint_one_time_token(&self, user_id: Uuid, purpose: TokenPurpose) -> AppResult<String> {
        let now = self.clock.now();
        let ttl = match purpose {
            TokenPurpose::PasswordReset => self.reset_ttl,
            TokenPurpose::EmailVerification => self.verification_ttl,
        };
        let value = generate_token();
        self.one_time_tokens
            .insert(OneTimeToken {
                token_hash: hash_token(&value),
                user_id,
                purpose,
                created_at: now,
                expires_at: now + ttl,
            })
            .await?;
        Ok(value)
    }

    async fn consume_one_time_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> AppResult<OneTimeToken> {
        match self
            .one_time_tokens
            .take(&hash_token(token), purpose)
            .await?
        {
            Some(record) if !record.is_expired(self.clock.now()) => Ok(record),
            _ => Err(invalid_token()),
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid email or password").with_code(codes::INVALID_CREDENTIALS)
}

fn invalid_token() -> AppError {
    AppError::validation("Token is invalid or expired").with_code(codes::INVALID_TOKEN)
}
