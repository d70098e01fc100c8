use std::sync::Arc;

use auth::TokenService;
use auth_service::config::Config;
use auth_service::domain::principal::ports::CredentialServicePort;
use auth_service::domain::principal::service::CredentialService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::hashing::Argon2CredentialHasher;
use auth_service::outbound::repositories::PostgresPrincipalRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.expiration_seconds,
        "Configuration loaded"
    );

    // A missing or weak signing secret, or an unusable token lifetime, stops the process here.
    let token_service = Arc::new(TokenService::new(config.jwt.secret.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "Invalid token signing configuration");
        e
    })?);
    let token_ttl = config.jwt.token_ttl().map_err(|e| {
        tracing::error!(error = %e, "Invalid token lifetime configuration");
        e
    })?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let principal_repository = Arc::new(PostgresPrincipalRepository::new(pg_pool));
    let credential_hasher = Arc::new(Argon2CredentialHasher::new());

    let credential_service: Arc<dyn CredentialServicePort> = Arc::new(CredentialService::new(
        principal_repository,
        credential_hasher,
        Arc::clone(&token_service),
        token_ttl,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(credential_service, token_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
