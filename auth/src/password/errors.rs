use thiserror::Error;

/// Error type for credential hashing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Credential hashing failed: {0}")]
    HashingFailed(String),

    #[error("Credential verification failed: {0}")]
    VerificationFailed(String),
}
