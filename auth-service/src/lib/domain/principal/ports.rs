use async_trait::async_trait;

use crate::domain::principal::models::AuthenticatedSession;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Subject;
use crate::principal::errors::PrincipalError;

/// Port for credential operations: registration, login and principal loading.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new principal and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated subject, credential and profile
    ///
    /// # Returns
    /// Stored principal with a freshly issued bearer token
    ///
    /// # Errors
    /// * `DuplicateSubject` - Subject is already registered
    /// * `Hashing` - Credential hashing failed
    /// * `Token` - Token issuance failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand)
        -> Result<AuthenticatedSession, PrincipalError>;

    /// Verify credentials and issue a token.
    ///
    /// # Arguments
    /// * `subject` - Login identifier
    /// * `credential` - Plaintext credential
    ///
    /// # Returns
    /// Principal with a freshly issued bearer token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown subject, wrong credential or unusable account
    /// * `Hashing` - Stored digest could not be checked
    /// * `DatabaseError` - Database operation failed
    async fn login(
        &self,
        subject: &Subject,
        credential: &str,
    ) -> Result<AuthenticatedSession, PrincipalError>;

    /// Load the current principal for a subject.
    ///
    /// # Errors
    /// * `NotFound` - No principal with this subject
    /// * `DatabaseError` - Database operation failed
    async fn load_principal(&self, subject: &Subject) -> Result<Principal, PrincipalError>;
}

/// Persistence operations for the principal aggregate.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + 'static {
    /// Retrieve principal by subject.
    ///
    /// # Returns
    /// Optional principal (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<Principal>, PrincipalError>;

    /// Check whether a subject is already registered.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_subject(&self, subject: &Subject) -> Result<bool, PrincipalError>;

    /// Insert or update a principal.
    ///
    /// Implementations must enforce subject uniqueness themselves.
    ///
    /// # Returns
    /// Stored principal
    ///
    /// # Errors
    /// * `DuplicateSubject` - Another principal already owns this subject
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError>;
}

/// One-way credential hashing.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash a plaintext credential into a storable digest.
    ///
    /// # Errors
    /// * `Hashing` - Hashing failed
    fn hash(&self, plaintext: &str) -> Result<String, PrincipalError>;

    /// Check a plaintext credential against a stored digest.
    ///
    /// # Errors
    /// * `Hashing` - Digest could not be parsed or checked
    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PrincipalError>;

    /// Do the work of [`matches`](Self::matches) for a subject with no stored
    /// digest, so a miss costs as much as a wrong credential.
    fn matches_unknown(&self, plaintext: &str);
}
