use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::principal::models::Credential;
use crate::domain::principal::models::Profile;
use crate::domain::principal::models::RegisterCommand;
use crate::domain::principal::models::Subject;
use crate::inbound::http::router::AppState;
use crate::principal::errors::CredentialError;
use crate::principal::errors::ProfileError;
use crate::principal::errors::SubjectError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    state
        .credential_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    subject: String,
    credential: String,
    first_name: String,
    last_name: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid subject: {0}")]
    Subject(#[from] SubjectError),

    #[error("Invalid credential: {0}")]
    Credential(#[from] CredentialError),

    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let subject = Subject::new(self.subject)?;
        let credential = Credential::new(self.credential)?;
        let profile = Profile::new(self.first_name, self.last_name)?;
        Ok(RegisterCommand::new(subject, credential, profile))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
