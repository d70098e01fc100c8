use thiserror::Error;

/// Error type for token issuance and validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Issuing instant plus lifetime falls outside the representable range.
    #[error("Token lifetime out of range: {0}")]
    LifetimeOutOfRange(chrono::Duration),

    /// Malformed structure, bad signature, unsupported algorithm or missing claims.
    #[error("Token is invalid: {0}")]
    Invalid(String),

    /// Signature verified but the expiration instant has been reached.
    #[error("Token is expired")]
    Expired,
}

/// Signing key problems detected while building a [`TokenService`].
///
/// These are startup conditions: a service without a usable key must not run.
///
/// [`TokenService`]: super::TokenService
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Token signing secret is missing")]
    MissingSecret,

    #[error("Token signing secret too short: minimum {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },
}
