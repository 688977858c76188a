//! Authentication library
//!
//! Password hashing and bearer token issuance for the user service:
//! - Password hashing (Argon2id)
//! - Signed access token issuance and validation (HMAC JWT)
//! - Login and token resolution against a user lookup port
//!
//! The service plugs its persistence in through [`UserLookup`]; everything
//! else is configured once through [`AuthSettings`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{Claims, TokenIssuer, TokenVerifier};
//! use chrono::Duration;
//! use jsonwebtoken::Algorithm;
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let issuer = TokenIssuer::new(secret, Algorithm::HS256).unwrap();
//! let verifier = TokenVerifier::new(secret, Algorithm::HS256).unwrap();
//!
//! let token = issuer
//!     .issue(Claims::for_subject("a@b.com"), Duration::minutes(30))
//!     .unwrap();
//! let claims = verifier.verify(&token).unwrap();
//! assert_eq!(claims.sub, "a@b.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod lookup;
pub mod password;
pub mod settings;

// Re-export commonly used items
pub use authenticator::AccessToken;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::BEARER;
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use lookup::LookupError;
pub use lookup::StoredUser;
pub use lookup::UserLookup;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use settings::AuthSettings;

pub use jsonwebtoken::Algorithm;
