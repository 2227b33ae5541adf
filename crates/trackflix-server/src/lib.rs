//! Watchlist server: accounts, cookie sessions and the per-user watched list.

use anyhow::{anyhow, Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use trackflix_config::{Config, ServerConfig};
use tracing::info;

pub mod api;
pub mod error;
pub mod store;

pub use error::{ApiError, ApiJson};
pub use store::{normalize_email, StoreError, UserStore};

pub const SESSION_COOKIE_NAME: &str = "trackflix.sid";

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: UserStore,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(store: UserStore, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }
}

/// Build the router. Mutations sit behind the session guard; reads, account
/// routes and `/health` do not.
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let protected = Router::new()
        .route("/add-movie", post(api::add_movie))
        .route("/remove-movie", post(api::remove_movie))
        .route_layer(middleware::from_fn(api::require_session));

    let public = Router::new()
        .route("/signup", post(api::signup))
        .route("/login", post(api::login))
        .route("/logout", post(api::logout))
        .route("/user", get(api::current_user))
        .route("/user-movies", get(api::user_movies))
        .merge(api::health_routes());

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(i64::from(
            config.session_ttl_hours,
        ))));

    let origin = HeaderValue::from_str(&config.allowed_origin)
        .map_err(|e| anyhow!("Invalid allowed_origin '{}': {}", config.allowed_origin, e))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .merge(protected)
        .merge(public)
        .layer(sessions)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Run the server until Ctrl-C
pub async fn serve(config: &Config, users_dir: PathBuf) -> Result<()> {
    config.validate_server()?;
    let config = &config.server;
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address))?;

    let store = UserStore::new(users_dir)?;
    let app = build_router(AppState::new(store, config.bcrypt_cost), config)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Watchlist server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
