use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenService;
use chrono::Duration;

use crate::domain::principal::models::AuthenticatedSession;
use crate::domain::principal::models::IssuedToken;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Subject;
use crate::principal::errors::PrincipalError;
use crate::principal::ports::CredentialHasher;
use crate::principal::ports::CredentialServicePort;
use crate::principal::ports::PrincipalRepository;

/// Domain service implementation for credential operations.
///
/// Orchestrates the repository, the credential hasher and the token service.
pub struct CredentialService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    repository: Arc<PR>,
    hasher: Arc<CH>,
    token_service: Arc<TokenService>,
    token_ttl: Duration,
}

impl<PR, CH> CredentialService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Principal persistence implementation
    /// * `hasher` - Credential hashing implementation
    /// * `token_service` - Token issuer
    /// * `token_ttl` - Lifetime of issued tokens
    pub fn new(
        repository: Arc<PR>,
        hasher: Arc<CH>,
        token_service: Arc<TokenService>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            hasher,
            token_service,
            token_ttl,
        }
    }

    fn issue_token(&self, principal: &Principal) -> Result<IssuedToken, PrincipalError> {
        let mut extra_claims = HashMap::new();
        extra_claims.insert(
            "role".to_string(),
            serde_json::Value::from(principal.role.as_str()),
        );

        let access_token = self.token_service.issue(
            principal.subject.as_str(),
            extra_claims,
            self.token_ttl,
        )?;

        Ok(IssuedToken::bearer(
            access_token,
            self.token_ttl.num_seconds(),
        ))
    }
}

#[async_trait]
impl<PR, CH> CredentialServicePort for CredentialService<PR, CH>
where
    PR: PrincipalRepository,
    CH: CredentialHasher,
{
    async fn register(
        &self,
        command: RegisterCommand,
    ) -> Result<AuthenticatedSession, PrincipalError> {
        tracing::info!(subject = %command.subject, "Registration attempt");

        if self.repository.exists_by_subject(&command.subject).await? {
            tracing::warn!(subject = %command.subject, "Registration rejected: subject exists");
            return Err(PrincipalError::DuplicateSubject(
                command.subject.as_str().to_string(),
            ));
        }

        let credential_digest = self.hasher.hash(command.credential.expose())?;
        let principal = Principal::register(command.subject, credential_digest, command.profile);

        // The store's uniqueness guard settles concurrent registrations.
        let principal = self.repository.save(principal).await.map_err(|e| {
            if let PrincipalError::DuplicateSubject(subject) = &e {
                tracing::warn!(subject = %subject, "Registration lost uniqueness race");
            }
            e
        })?;

        let token = self.issue_token(&principal)?;

        tracing::info!(
            subject = %principal.subject,
            principal_id = %principal.id,
            role = %principal.role,
            "Registration successful"
        );

        Ok(AuthenticatedSession { principal, token })
    }

    async fn login(
        &self,
        subject: &Subject,
        credential: &str,
    ) -> Result<AuthenticatedSession, PrincipalError> {
        tracing::info!(subject = %subject, "Login attempt");

        let Some(principal) = self.repository.find_by_subject(subject).await? else {
            self.hasher.matches_unknown(credential);
            tracing::warn!(subject = %subject, reason = "unknown_subject", "Login failed");
            return Err(PrincipalError::InvalidCredentials);
        };

        if !self
            .hasher
            .matches(credential, &principal.credential_digest)?
        {
            tracing::warn!(subject = %subject, reason = "bad_credential", "Login failed");
            return Err(PrincipalError::InvalidCredentials);
        }

        if !principal.can_authenticate() {
            tracing::warn!(
                subject = %subject,
                reason = "account_unusable",
                enabled = principal.enabled,
                account_locked = principal.account_locked,
                credentials_expired = principal.credentials_expired,
                "Login failed"
            );
            return Err(PrincipalError::InvalidCredentials);
        }

        let token = self.issue_token(&principal)?;

        tracing::info!(subject = %subject, role = %principal.role, "Login successful");

        Ok(AuthenticatedSession { principal, token })
    }

    async fn load_principal(&self, subject: &Subject) -> Result<Principal, PrincipalError> {
        self.repository
            .find_by_subject(subject)
            .await?
            .ok_or(PrincipalError::NotFound(subject.to_string()))
    }
}
