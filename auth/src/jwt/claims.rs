use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Access token claims.
///
/// `sub` carries the user's email and `exp` the absolute expiry as a Unix
/// timestamp. Both are stamped or checked by the issuer and verifier; any
/// other custom fields travel in the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject (user email)
    #[serde(default)]
    pub sub: String,

    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims for the given subject. Expiry is set at issuance.
    pub fn for_subject(sub: impl ToString) -> Self {
        Self {
            sub: sub.to_string(),
            ..Self::default()
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// A token is only valid strictly before its `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }

    pub fn has_subject(&self) -> bool {
        !self.sub.trim().is_empty()
    }
}
