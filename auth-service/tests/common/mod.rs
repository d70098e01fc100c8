#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenService;
use auth_service::config::JwtConfig;
use auth_service::domain::principal::models::Principal;
use auth_service::domain::principal::models::Role;
use auth_service::domain::principal::models::Subject;
use auth_service::domain::principal::ports::CredentialServicePort;
use auth_service::domain::principal::ports::PrincipalRepository;
use auth_service::domain::principal::service::CredentialService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::hashing::Argon2CredentialHasher;
use auth_service::principal::errors::PrincipalError;
use tokio::sync::Barrier;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Principal store kept in memory for the lifetime of one test.
///
/// The insert path enforces subject uniqueness under the lock, the same
/// guarantee the database constraint gives the Postgres repository.
#[derive(Default)]
pub struct InMemoryPrincipalRepository {
    principals: Mutex<HashMap<String, Principal>>,
    save_barrier: Option<Barrier>,
}

impl InMemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every `save` until `writers` saves are pending, so that all of
    /// them have already passed the existence check.
    pub fn with_save_barrier(writers: usize) -> Self {
        Self {
            save_barrier: Some(Barrier::new(writers)),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.principals.lock().unwrap().len()
    }

    /// Apply `change` to a stored principal, as an operator would.
    pub fn update(&self, subject: &str, change: impl FnOnce(&mut Principal)) {
        let mut principals = self.principals.lock().unwrap();
        let principal = principals
            .get_mut(subject)
            .expect("principal should exist before it is updated");
        change(principal);
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalRepository {
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<Principal>, PrincipalError> {
        Ok(self.principals.lock().unwrap().get(subject.as_str()).cloned())
    }

    async fn exists_by_subject(&self, subject: &Subject) -> Result<bool, PrincipalError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .contains_key(subject.as_str()))
    }

    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        if let Some(barrier) = &self.save_barrier {
            barrier.wait().await;
        }

        let mut principals = self.principals.lock().unwrap();
        if let Some(existing) = principals.get(principal.subject.as_str()) {
            if existing.id != principal.id {
                return Err(PrincipalError::DuplicateSubject(
                    principal.subject.as_str().to_string(),
                ));
            }
        }
        principals.insert(principal.subject.as_str().to_string(), principal.clone());
        Ok(principal)
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryPrincipalRepository>,
    pub token_service: Arc<TokenService>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(InMemoryPrincipalRepository::new()).await
    }

    /// Spawn the application on top of a prepared repository.
    pub async fn spawn_with(repository: InMemoryPrincipalRepository) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let jwt = JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_seconds: 3600,
        };

        let repository = Arc::new(repository);
        let token_service = Arc::new(
            TokenService::new(jwt.secret.as_bytes()).expect("Test secret should be accepted"),
        );
        let credential_service: Arc<dyn CredentialServicePort> =
            Arc::new(CredentialService::new(
                Arc::clone(&repository),
                Arc::new(Argon2CredentialHasher::new()),
                Arc::clone(&token_service),
                jwt.token_ttl().expect("Test lifetime should be accepted"),
            ));

        let app = create_router(credential_service, Arc::clone(&token_service));

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to run server");
        });

        Self {
            address,
            port,
            repository,
            token_service,
            api_client: reqwest::Client::new(),
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Register a principal and return the issued token.
    pub async fn register(&self, subject: &str, credential: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&serde_json::json!({
                "subject": subject,
                "credential": credential,
                "first_name": "Test",
                "last_name": "Principal",
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Registration should return a token")
            .to_string()
    }

    pub fn set_role(&self, subject: &str, role: Role) {
        self.repository.update(subject, |principal| principal.role = role);
    }
}
