use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::domain::principal::models::Role;
use crate::domain::principal::models::Subject;
use crate::inbound::http::context::AuthenticatedContext;
use crate::inbound::http::router::AppState;

/// Admin lookup of a principal by subject.
pub async fn get_principal(
    State(state): State<AppState>,
    context: AuthenticatedContext,
    Path(subject): Path<String>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    context.require_role(Role::Admin)?;

    let subject = Subject::new(subject).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .credential_service
        .load_principal(&subject)
        .await
        .map_err(ApiError::from)
        .map(|ref principal| ApiSuccess::new(StatusCode::OK, principal.into()))
}
