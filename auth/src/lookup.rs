use async_trait::async_trait;
use thiserror::Error;

/// Persisted user record as seen by the authentication flow.
///
/// Owned by the persistence layer; the authenticator only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Failure of the lookup collaborator itself (not "user absent").
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("User lookup failed: {0}")]
pub struct LookupError(pub String);

/// Port through which the authenticator finds users by email.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional stored user (None if not found)
    ///
    /// # Errors
    /// * `LookupError` - The backing store could not be queried
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, LookupError>;
}
