use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::principal::models::Subject;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    // A malformed subject cannot belong to anyone: same answer as a bad password.
    let subject = Subject::new(body.subject).map_err(|_| {
        tracing::warn!(reason = "malformed_subject", "Login failed");
        ApiError::invalid_credentials()
    })?;

    state
        .credential_service
        .login(&subject, &body.credential)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    subject: String,
    credential: String,
}
