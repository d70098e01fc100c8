use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::handlers::ApiError;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::Role;
use crate::domain::principal::models::Subject;

/// Per-request authentication state set by the interceptor.
///
/// Lives in the request extensions for the duration of one request. Handlers
/// that take it as an extractor reject the request with `401` when no
/// context was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedContext {
    pub subject: Subject,
    pub role: Role,
    pub authorities: Vec<String>,
}

impl AuthenticatedContext {
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            subject: principal.subject.clone(),
            role: principal.role,
            authorities: vec![principal.role.authority().to_string()],
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    /// Fail with `403` unless the context carries the role's authority.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.has_authority(role.authority()) {
            Ok(())
        } else {
            tracing::warn!(
                subject = %self.subject,
                required = role.authority(),
                "Access denied"
            );
            Err(ApiError::Forbidden("Access denied".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
