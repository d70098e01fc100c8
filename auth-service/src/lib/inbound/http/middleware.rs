use auth::TokenError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;

use crate::domain::principal::models::Subject;
use crate::inbound::http::context::AuthenticatedContext;
use crate::inbound::http::router::AppState;
use crate::principal::errors::PrincipalError;
use crate::principal::errors::SubjectError;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a presented bearer token did not yield an authenticated context.
#[derive(Debug, Error)]
enum BearerAuthenticationError {
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("subject claim is not a valid subject: {0}")]
    Subject(#[from] SubjectError),

    #[error("principal could not be loaded: {0}")]
    Principal(#[from] PrincipalError),

    #[error("principal {0} is disabled, locked or has expired credentials")]
    Unusable(Subject),
}

/// Bearer token interceptor.
///
/// Establishes an [`AuthenticatedContext`] when the request carries a valid
/// token for a usable principal. Never rejects: requests without a usable
/// token continue unauthenticated and are turned away later by the
/// `AuthenticatedContext` extractor where authentication is required.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthenticatedContext>().is_some() {
        tracing::debug!("Request already authenticated, skipping bearer token");
        return next.run(req).await;
    }

    match resolve_context(&state, req.headers()).await {
        Ok(Some(context)) => {
            tracing::info!(
                subject = %context.subject,
                role = %context.role,
                "Request authenticated via bearer token"
            );
            req.extensions_mut().insert(context);
        }
        Ok(None) => {
            tracing::debug!("No bearer token found in Authorization header");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Bearer authentication failed, continuing unauthenticated");
        }
    }

    next.run(req).await
}

async fn resolve_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthenticatedContext>, BearerAuthenticationError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let claims = state.token_service.validate(token)?;
    let subject = Subject::new(claims.sub)?;

    let principal = state.credential_service.load_principal(&subject).await?;
    if !principal.can_authenticate() {
        return Err(BearerAuthenticationError::Unusable(subject));
    }

    Ok(Some(AuthenticatedContext::for_principal(&principal)))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` for a missing header, a non-UTF-8 value, another scheme or
/// an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use auth::TokenService;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::middleware::Next;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use chrono::Duration;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::principal::models::AuthenticatedSession;
    use crate::domain::principal::models::Principal;
    use crate::domain::principal::models::Profile;
    use crate::domain::principal::models::RegisterCommand;
    use crate::domain::principal::models::Role;
    use crate::domain::principal::ports::CredentialServicePort;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestCredentialService {}

        #[async_trait]
        impl CredentialServicePort for TestCredentialService {
            async fn register(&self, command: RegisterCommand) -> Result<AuthenticatedSession, PrincipalError>;
            async fn login(&self, subject: &Subject, credential: &str) -> Result<AuthenticatedSession, PrincipalError>;
            async fn load_principal(&self, subject: &Subject) -> Result<Principal, PrincipalError>;
        }
    }

    fn principal(subject: &str, role: Role) -> Principal {
        let mut principal = Principal::register(
            Subject::new(subject.to_string()).unwrap(),
            "digest".to_string(),
            Profile::new("Test".to_string(), "Principal".to_string()).unwrap(),
        );
        principal.role = role;
        principal
    }

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET).unwrap())
    }

    fn token_for(tokens: &TokenService, subject: &str, ttl: Duration) -> String {
        tokens.issue(subject, HashMap::new(), ttl).unwrap()
    }

    async fn whoami(context: Option<Extension<AuthenticatedContext>>) -> String {
        match context {
            Some(Extension(context)) => {
                format!("{} {}", context.subject, context.authorities.join(","))
            }
            None => "anonymous".to_string(),
        }
    }

    fn app(service: MockTestCredentialService, tokens: Arc<TokenService>) -> Router {
        let state = AppState {
            credential_service: Arc::new(service),
            token_service: tokens,
        };

        Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn_with_state(state, authenticate))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri("/");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn loader_never_called() -> MockTestCredentialService {
        let mut service = MockTestCredentialService::new();
        service.expect_load_principal().times(0);
        service
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_no_header_passes_through() {
        let (status, body) = call(app(loader_never_called(), token_service()), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_other_scheme_passes_through() {
        let (status, body) = call(
            app(loader_never_called(), token_service()),
            Some("Basic dXNlcjpwYXNz"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_malformed_token_passes_through() {
        let (status, body) = call(
            app(loader_never_called(), token_service()),
            Some("Bearer malformed.token.value"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_expired_token_passes_through() {
        let tokens = token_service();
        let token = token_for(&tokens, "john@hospital.com", Duration::minutes(-5));

        let (status, body) = call(
            app(loader_never_called(), tokens),
            Some(&format!("Bearer {}", token)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_token_establishes_context() {
        let tokens = token_service();
        let token = token_for(&tokens, "john@hospital.com", Duration::hours(1));

        let mut service = MockTestCredentialService::new();
        service
            .expect_load_principal()
            .withf(|subject| subject.as_str() == "john@hospital.com")
            .times(1)
            .returning(|_| Ok(principal("john@hospital.com", Role::Doctor)));

        let (status, body) = call(app(service, tokens), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "john@hospital.com ROLE_DOCTOR");
    }

    #[tokio::test]
    async fn test_unknown_principal_passes_through() {
        let tokens = token_service();
        let token = token_for(&tokens, "ghost@hospital.com", Duration::hours(1));

        let mut service = MockTestCredentialService::new();
        service
            .expect_load_principal()
            .times(1)
            .returning(|subject| Err(PrincipalError::NotFound(subject.to_string())));

        let (status, body) = call(app(service, tokens), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_loader_failure_passes_through() {
        let tokens = token_service();
        let token = token_for(&tokens, "john@hospital.com", Duration::hours(1));

        let mut service = MockTestCredentialService::new();
        service
            .expect_load_principal()
            .times(1)
            .returning(|_| Err(PrincipalError::DatabaseError("pool timed out".to_string())));

        let (status, body) = call(app(service, tokens), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_disabled_principal_passes_through() {
        let tokens = token_service();
        let token = token_for(&tokens, "john@hospital.com", Duration::hours(1));

        let mut service = MockTestCredentialService::new();
        service.expect_load_principal().times(1).returning(|_| {
            let mut principal = principal("john@hospital.com", Role::Doctor);
            principal.enabled = false;
            Ok(principal)
        });

        let (status, body) = call(app(service, tokens), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_existing_context_is_not_overwritten() {
        async fn preauthenticate(mut req: Request, next: Next) -> Response {
            let nurse = principal("nurse@hospital.com", Role::Nurse);
            req.extensions_mut()
                .insert(AuthenticatedContext::for_principal(&nurse));
            next.run(req).await
        }

        let tokens = token_service();
        let token = token_for(&tokens, "john@hospital.com", Duration::hours(1));

        let app = app(loader_never_called(), tokens).layer(middleware::from_fn(preauthenticate));

        let (status, body) = call(app, Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "nurse@hospital.com ROLE_NURSE");
    }
}
