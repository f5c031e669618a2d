//! Access token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use backoffice_core::clock::SharedClock;
use backoffice_core::config::auth::AuthConfig;

use super::claims::AccessClaims;

/// Why an access token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    /// The token was well-formed and correctly signed but `now >= exp`.
    #[error("token has expired")]
    Expired,
    /// The token could not be parsed or carried an unexpected claim set.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the signing secret.
    #[error("token signature is invalid")]
    InvalidSignature,
}

impl TokenRejection {
    /// Machine-readable reason, used in logs and the validate endpoint.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::Malformed => "MALFORMED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
        }
    }
}

/// Validates access tokens against the signing secret and the injected
/// clock. Never touches storage.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: SharedClock,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: SharedClock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Decodes a token. Valid iff the signature matches, the claim set is
    /// exact, and `now < exp`.
    pub fn decode_access_token(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                _ => TokenRejection::Malformed,
            },
        )?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenRejection::Expired);
        }
        Ok(data.claims)
    }
}
