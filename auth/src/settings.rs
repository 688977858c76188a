use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::jwt::TokenError;

/// Access token lifetime used when none is configured.
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Immutable authentication settings, built once from configuration and
/// handed to [`crate::Authenticator::new`].
#[derive(Clone)]
pub struct AuthSettings {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_token_ttl: Duration,
}

impl AuthSettings {
    /// Build settings from raw configuration values.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, must not be empty
    /// * `algorithm` - Algorithm name, one of `HS256`, `HS384`, `HS512`
    /// * `expire_minutes` - Access token lifetime in minutes, must not be negative
    ///
    /// # Errors
    /// * `SigningError` - Any of the values cannot be used for signing
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: &str,
        expire_minutes: i64,
    ) -> Result<Self, TokenError> {
        let secret = secret.into();
        ensure_secret(&secret)?;

        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| TokenError::SigningError(format!("Unknown algorithm: {}", algorithm)))?;
        let algorithm = ensure_hmac(algorithm)?;

        if expire_minutes < 0 {
            return Err(TokenError::SigningError(format!(
                "Access token lifetime must not be negative, got {} minutes",
                expire_minutes
            )));
        }
        let access_token_ttl = Duration::try_minutes(expire_minutes).ok_or_else(|| {
            TokenError::SigningError(format!(
                "Access token lifetime out of range: {} minutes",
                expire_minutes
            ))
        })?;

        Ok(Self {
            secret,
            algorithm,
            access_token_ttl,
        })
    }

    /// HS256 with the default 30 minute lifetime.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        Self::new(secret, "HS256", DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES)
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

pub(crate) fn ensure_secret(secret: &[u8]) -> Result<(), TokenError> {
    if secret.is_empty() {
        return Err(TokenError::SigningError(
            "Secret key must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Only the HMAC family is accepted; keys are shared secrets.
pub(crate) fn ensure_hmac(algorithm: Algorithm) -> Result<Algorithm, TokenError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(TokenError::SigningError(format!(
            "Unsupported algorithm: {:?}",
            other
        ))),
    }
}
