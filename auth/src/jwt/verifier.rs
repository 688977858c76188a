use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use crate::settings::ensure_hmac;
use crate::settings::ensure_secret;

/// Validates access tokens.
///
/// Signature, algorithm and expiry are checked in one step; nothing in the
/// claims is trusted until all of them pass.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a new verifier pinned to one algorithm.
    ///
    /// # Errors
    /// * `SigningError` - Secret is empty or algorithm is not HMAC
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        ensure_secret(secret)?;
        let algorithm = ensure_hmac(algorithm)?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Decode and validate a token.
    ///
    /// # Returns
    /// Claims with a non-empty `sub` and an `exp` in the future
    ///
    /// # Errors
    /// * `InvalidCredentials` - Bad signature, wrong algorithm, malformed,
    ///   expired, or missing/empty subject
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Token rejected");
                TokenError::InvalidCredentials
            })?;

        // The decoder compares with `<`, a token is dead at its `exp` second.
        if claims.is_expired(Utc::now().timestamp()) {
            tracing::debug!(exp = claims.exp, "Token rejected: expired");
            return Err(TokenError::InvalidCredentials);
        }

        if !claims.has_subject() {
            tracing::debug!("Token rejected: empty subject");
            return Err(TokenError::InvalidCredentials);
        }

        Ok(claims)
    }
}
