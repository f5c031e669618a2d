//! Identity extractors.
//!
//! The access guard middleware resolves credentials once per request and
//! stores the resulting [`Identity`] in the request extensions. These
//! extractors read it back and reject callers that do not qualify.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use backoffice_auth::{AccessClaims, Identity};
use backoffice_core::error::AppError;
use backoffice_entity::api_key::ApiKey;

use crate::error::ApiError;

fn identity_of(parts: &Parts) -> Identity {
    parts
        .extensions
        .get::<Identity>()
        .cloned()
        .unwrap_or(Identity::Anonymous)
}

/// Whoever is calling, anonymous included.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_of(parts)))
    }
}

/// Any authenticated caller, user or API key.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_of(parts);
        if identity.is_authenticated() {
            Ok(Self(identity))
        } else {
            Err(AppError::not_authenticated().into())
        }
    }
}

/// A user presenting a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl std::ops::Deref for AuthUser {
    type Target = AccessClaims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_of(parts) {
            Identity::User(claims) => Ok(Self(claims)),
            _ => Err(AppError::not_authenticated().into()),
        }
    }
}

/// A machine client presenting an active API key.
#[derive(Debug, Clone)]
pub struct ApiKeyPrincipal(pub ApiKey);

impl<S> FromRequestParts<S> for ApiKeyPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_of(parts) {
            Identity::ApiKey(key) => Ok(Self(key)),
            _ => Err(AppError::authentication("API key authentication required").into()),
        }
    }
}
