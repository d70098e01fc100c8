use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::principal::models::AuthenticatedSession;
use crate::domain::principal::models::Principal;
use crate::principal::errors::PrincipalError;

pub mod get_principal;
pub mod login;
pub mod me;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl ApiError {
    /// The single message every failed login produces.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(PrincipalError::InvalidCredentials.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<PrincipalError> for ApiError {
    fn from(err: PrincipalError) -> Self {
        match err {
            PrincipalError::DuplicateSubject(_) => ApiError::Conflict(err.to_string()),
            PrincipalError::InvalidCredentials => ApiError::invalid_credentials(),
            PrincipalError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PrincipalError::InvalidSubject(_)
            | PrincipalError::InvalidCredential(_)
            | PrincipalError::InvalidProfile(_)
            | PrincipalError::InvalidRole(_) => ApiError::UnprocessableEntity(err.to_string()),
            PrincipalError::Hashing(_)
            | PrincipalError::Token(_)
            | PrincipalError::DatabaseError(_)
            | PrincipalError::Unknown(_) => {
                tracing::error!(error = %err, "Credential operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Token plus principal summary returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub token: String,
    pub token_type: String,
    pub expires_in_seconds: i64,
    pub principal: PrincipalData,
}

impl From<&AuthenticatedSession> for SessionResponseData {
    fn from(session: &AuthenticatedSession) -> Self {
        Self {
            token: session.token.access_token.clone(),
            token_type: session.token.token_type.to_string(),
            expires_in_seconds: session.token.expires_in_seconds,
            principal: (&session.principal).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalData {
    pub id: String,
    pub subject: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            subject: principal.subject.as_str().to_string(),
            first_name: principal.profile.first_name.clone(),
            last_name: principal.profile.last_name.clone(),
            role: principal.role.as_str().to_string(),
            enabled: principal.enabled,
            created_at: principal.created_at,
        }
    }
}
