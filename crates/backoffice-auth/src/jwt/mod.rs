//! JWT access token encoding and validation.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{AccessClaims, AccessTokenSubject};
pub use decoder::{JwtDecoder, TokenRejection};
pub use encoder::{IssuedAccessToken, JwtEncoder};
