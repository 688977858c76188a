use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::lookup::LookupError;
use crate::lookup::StoredUser;
use crate::lookup::UserLookup;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::settings::AuthSettings;

/// Token type reported alongside every issued access token.
pub const BEARER: &str = "Bearer";

/// Authentication coordinator combining password verification and token handling.
///
/// Owns no mutable state; one instance is shared by every request.
pub struct Authenticator<L: UserLookup + ?Sized> {
    lookup: Arc<L>,
    password_hasher: PasswordHasher,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    access_token_ttl: Duration,
    // Verified against when the email is unknown, so both failures cost one Argon2 run.
    dummy_hash: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: BEARER.to_string(),
        }
    }
}

/// Authentication operation errors.
///
/// Every credential problem surfaces as `InvalidCredentials`, whatever the
/// underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Could not validate credentials")]
    InvalidCredentials,

    #[error("Token signing failed: {0}")]
    SigningError(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("{0}")]
    Lookup(String),
}

impl From<TokenError> for AuthenticationError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::SigningError(msg) => Self::SigningError(msg),
            TokenError::InvalidCredentials => Self::InvalidCredentials,
        }
    }
}

impl From<PasswordError> for AuthenticationError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::HashingFailed(msg) => Self::HashingFailed(msg),
            PasswordError::MalformedHash(msg) => Self::MalformedHash(msg),
        }
    }
}

impl From<LookupError> for AuthenticationError {
    fn from(err: LookupError) -> Self {
        Self::Lookup(err.to_string())
    }
}

impl<L: UserLookup + ?Sized> Authenticator<L> {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `settings` - Secret, algorithm and access token lifetime
    /// * `lookup` - Collaborator resolving users by email
    ///
    /// # Errors
    /// * `SigningError` - Settings cannot be used to sign or verify tokens
    /// * `HashingFailed` - The placeholder hash could not be generated
    pub fn new(settings: &AuthSettings, lookup: Arc<L>) -> Result<Self, AuthenticationError> {
        let password_hasher = PasswordHasher::new();
        let dummy_hash = password_hasher.hash("dummy password")?;

        Ok(Self {
            lookup,
            password_hasher,
            issuer: TokenIssuer::new(settings.secret(), settings.algorithm())?,
            verifier: TokenVerifier::new(settings.secret(), settings.algorithm())?,
            access_token_ttl: settings.access_token_ttl(),
            dummy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check an email/password pair and issue an access token.
    ///
    /// An unknown email and a wrong password fail identically.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No such user or password mismatch
    /// * `MalformedHash` - The stored hash is corrupted
    /// * `SigningError` - Token generation failed
    /// * `Lookup` - The user store could not be queried
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccessToken, AuthenticationError> {
        let Some(user) = self.lookup.find_by_email(email).await? else {
            let _ = self.password_hasher.verify(password, &self.dummy_hash);
            tracing::warn!("Login rejected: unknown email");
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AuthenticationError::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(Claims::for_subject(&user.email), self.access_token_ttl)?;

        tracing::info!(user_id = user.id, "Access token issued");
        Ok(AccessToken::bearer(token))
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token invalid or expired, or its user no longer exists
    /// * `Lookup` - The user store could not be queried
    pub async fn resolve(&self, token: &str) -> Result<StoredUser, AuthenticationError> {
        let claims = self.verifier.verify(token)?;

        match self.lookup.find_by_email(&claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(subject = %claims.sub, "Token subject no longer exists");
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    /// Lifetime given to tokens issued by [`Self::login`].
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}
