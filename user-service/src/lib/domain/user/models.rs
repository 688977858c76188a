use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::user::errors::EmailError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
}

impl From<User> for auth::StoredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            email: user.email.as_str().to_string(),
            username: user.username.as_str().to_string(),
            password_hash: user.password_hash,
        }
    }
}

/// User not yet persisted; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - Decimal id to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not an integer
    /// * `NotPositive` - Ids start at 1
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        let id = s
            .parse::<i64>()
            .map_err(|e| UserIdError::InvalidFormat(format!("{}: {}", s, e)))?;

        if id < 1 {
            return Err(UserIdError::NotPositive(id));
        }

        Ok(Self(id))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters of alphanumerics, spaces, underscores
/// and hyphens, without leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains characters other than alphanumerics, space, _ and -
    /// * `SurroundingWhitespace` - Starts or ends with whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username.trim() != username {
            return Err(UsernameError::SurroundingWhitespace);
        }

        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    /// Get username as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
}

impl CreateUserCommand {
    /// Construct a new create user command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(username: Username, email: EmailAddress, password: String) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command replacing every mutable field of an existing user.
#[derive(Debug)]
pub struct UpdateUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
}

/// Window over the user list, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Pagination {
    const DEFAULT_LIMIT: u32 = 10;
    const MAX_LIMIT: u32 = 100;

    fn default_limit() -> u32 {
        Self::DEFAULT_LIMIT
    }

    /// Limit clamped to what a single page may return.
    pub fn effective_limit(&self) -> u32 {
        self.limit.min(Self::MAX_LIMIT)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parsing() {
        assert_eq!(UserId::from_string("1"), Ok(UserId(1)));
        assert!(matches!(
            UserId::from_string("abc"),
            Err(UserIdError::InvalidFormat(_))
        ));
        assert_eq!(UserId::from_string("0"), Err(UserIdError::NotPositive(0)));
        assert!(UserId::from_string("99999999999999999999").is_err());
    }

    #[test]
    fn test_username_validation() {
        assert!(Username::new("test".to_string()).is_ok());
        assert!(Username::new("updated user".to_string()).is_ok());
        assert!(Username::new("Raphael_99-x".to_string()).is_ok());

        assert_eq!(
            Username::new("ab".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
        assert_eq!(
            Username::new("a".repeat(33)),
            Err(UsernameError::TooLong {
                max: 32,
                actual: 33
            })
        );
        assert_eq!(
            Username::new("bad!name".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::new(" padded".to_string()),
            Err(UsernameError::SurroundingWhitespace)
        );
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("test@test.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_pagination_defaults_and_clamp() {
        let page = Pagination::default();
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);

        let page = Pagination {
            limit: 1_000,
            offset: 0,
        };
        assert_eq!(page.effective_limit(), 100);
    }

    #[test]
    fn test_stored_user_conversion() {
        let user = User {
            id: UserId(7),
            username: Username::new("test".to_string()).unwrap(),
            email: EmailAddress::new("test@test.com".to_string()).unwrap(),
            password_hash: "$argon2id$hash".to_string(),
        };

        let stored: auth::StoredUser = user.into();
        assert_eq!(stored.id, 7);
        assert_eq!(stored.email, "test@test.com");
        assert_eq!(stored.username, "test");
        assert_eq!(stored.password_hash, "$argon2id$hash");
    }
}
