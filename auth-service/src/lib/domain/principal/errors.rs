use thiserror::Error;

/// Error for Subject validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubjectError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for plaintext credential validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Credential too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for profile field validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} is required")]
    Blank { field: &'static str },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Top-level error for all principal-related operations
#[derive(Debug, Clone, Error)]
pub enum PrincipalError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid subject: {0}")]
    InvalidSubject(#[from] SubjectError),

    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("Subject already exists: {0}")]
    DuplicateSubject(String),

    /// Unknown subject, wrong credential and unusable account all collapse here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Principal not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Credential hashing error: {0}")]
    Hashing(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for PrincipalError {
    fn from(err: anyhow::Error) -> Self {
        PrincipalError::Unknown(err.to_string())
    }
}
