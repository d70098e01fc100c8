use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Claim names owned by the token service. Extra claims may not shadow them.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Claims carried by a bearer token.
///
/// The subject and both timestamps are mandatory. Custom attributes such as
/// `role` live in `extra` and are flattened into the token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (principal identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims for `subject` issued at `issued_at` and valid for `ttl`.
    ///
    /// # Errors
    /// * `LifetimeOutOfRange` - `issued_at + ttl` is not a representable instant
    pub fn new(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::LifetimeOutOfRange(ttl))?;

        Ok(Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            extra: HashMap::new(),
        })
    }

    /// Merge custom fields, skipping any reserved claim name.
    pub fn with_extra_claims(mut self, extra: HashMap<String, serde_json::Value>) -> Self {
        for (key, value) in extra {
            if !RESERVED_CLAIMS.contains(&key.as_str()) {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Get role from extra fields (convenience method).
    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(|v| v.as_str())
    }

    /// Check if token is expired. The expiration instant itself counts as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
