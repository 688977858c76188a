use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::TokenError;
use crate::settings::ensure_hmac;
use crate::settings::ensure_secret;

/// Signs access tokens.
///
/// Uses a single HMAC algorithm fixed at construction.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl TokenIssuer {
    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `algorithm` - HMAC algorithm (HS256, HS384 or HS512)
    ///
    /// # Errors
    /// * `SigningError` - Secret is empty or algorithm is not HMAC
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        ensure_secret(secret)?;
        let algorithm = ensure_hmac(algorithm)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm,
        })
    }

    /// Stamp `iat`/`exp` on the claims and sign them.
    ///
    /// `exp` is `now + ttl` on the UTC clock.
    ///
    /// # Errors
    /// * `SigningError` - Expiry out of range or encoding failed
    pub fn issue(&self, claims: Claims, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::SigningError("Token expiry out of range".to_string())
        })?;

        let claims = claims
            .with_issued_at(now.timestamp())
            .with_expiration(expires_at.timestamp());

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningError(e.to_string()))
    }
}
