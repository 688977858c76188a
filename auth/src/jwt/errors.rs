use thiserror::Error;

/// Error type for token operations.
///
/// Verification failures are deliberately collapsed into a single
/// `InvalidCredentials` kind; the concrete reason is only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    SigningError(String),

    #[error("Could not validate credentials")]
    InvalidCredentials,
}
