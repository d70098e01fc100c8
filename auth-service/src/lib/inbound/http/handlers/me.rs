use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::context::AuthenticatedContext;

pub async fn me(
    context: AuthenticatedContext,
) -> Result<ApiSuccess<AuthenticatedContextData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&context).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedContextData {
    pub subject: String,
    pub role: String,
    pub authorities: Vec<String>,
}

impl From<&AuthenticatedContext> for AuthenticatedContextData {
    fn from(context: &AuthenticatedContext) -> Self {
        Self {
            subject: context.subject.as_str().to_string(),
            role: context.role.as_str().to_string(),
            authorities: context.authorities.clone(),
        }
    }
}
