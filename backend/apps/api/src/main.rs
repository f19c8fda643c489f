//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! auth crate.

use anyhow::Context;
use auth::domain::clock::{Clock, SystemClock};
use auth::{AuthAppState, AuthConfig, InMemoryAccountRepository, PgAccountRepository, api_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use platform::password::{Argon2Hasher, CredentialHasher};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_auth_config()?;
    config.validate()?;

    tracing::info!(
        work_factor = config.work_factor,
        max_login_attempts = config.max_login_attempts,
        lock_duration_secs = config.lock_duration.as_secs(),
        "Auth configuration loaded"
    );

    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new(
        config.work_factor,
        config.memory_kib,
        config.password_pepper.clone(),
    )?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let api = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let repo = PgAccountRepository::new(pool);
            api_router(AuthAppState::new(repo, config, hasher, clock))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            let repo = InMemoryAccountRepository::new();
            api_router(AuthAppState::new(repo, config, hasher, clock))
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Build the auth configuration from the environment.
///
/// Unset variables keep their defaults. The token secret is required
/// in release builds; debug builds fall back to a random one.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("AUTH_TOKEN_SECRET") {
        Ok(secret_b64) => AuthConfig {
            token_secret: Engine::decode(&general_purpose::STANDARD, secret_b64.trim())
                .context("AUTH_TOKEN_SECRET must be base64")?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_TOKEN_SECRET not set, using a random development secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("AUTH_TOKEN_SECRET must be set in production"),
    };

    if let Some(work_factor) = parse_env("AUTH_WORK_FACTOR")? {
        config.work_factor = work_factor;
    }
    if let Some(max_attempts) = parse_env("AUTH_MAX_LOGIN_ATTEMPTS")? {
        config.max_login_attempts = max_attempts;
    }
    if let Some(secs) = parse_env("AUTH_LOCK_DURATION_SECS")? {
        config.lock_duration = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_env("AUTH_TOKEN_TTL_SECS")? {
        config.token_ttl = Duration::from_secs(secs);
    }
    if let Ok(pepper) = env::var("AUTH_PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

fn parse_env<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not a valid value")),
        Err(_) => Ok(None),
    }
}
