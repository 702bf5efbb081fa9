//! Chirpy Server - HTTP API for chirpy
//!
//! Routes requests onto `chirpy-core` and serves the static site under `/app`.

pub mod error;
pub mod http;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use chirpy_core::{Chirpy, ChirpyConfig};

/// Shared application state
pub struct AppState {
    pub chirpy: Chirpy,
    /// Directory served under `/app`
    pub fileserver_path: PathBuf,
}

impl AppState {
    pub fn new(chirpy: Chirpy, fileserver_path: impl Into<PathBuf>) -> Self {
        Self {
            chirpy,
            fileserver_path: fileserver_path.into(),
        }
    }

    /// Open storage and wire everything from `config`
    pub fn from_config(config: &ChirpyConfig) -> chirpy_core::Result<Self> {
        Ok(Self::new(
            Chirpy::open(config)?,
            config.server.fileserver_path.clone(),
        ))
    }
}

/// Count static file responses that are not redirects
async fn count_hits(State(state): State<Arc<AppState>>, request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;
    if !response.status().is_redirection() {
        state.chirpy.hits().record();
    }
    response
}

/// Create the router with every route mounted
pub fn create_router(state: Arc<AppState>) -> Router {
    let fileserver: Router = Router::new()
        .fallback_service(ServeDir::new(&state.fileserver_path))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits));

    let api = Router::new()
        .route("/healthz", get(http::healthz))
        .route("/reset", get(http::reset))
        // Users
        .route("/users", post(http::create_user).put(http::update_user))
        .route("/login", post(http::login))
        // Tokens
        .route("/refresh", post(http::refresh))
        .route("/revoke", post(http::revoke))
        // Chirps
        .route("/chirps", post(http::create_chirp).get(http::list_chirps))
        .route(
            "/chirps/{id}",
            get(http::get_chirp).delete(http::delete_chirp),
        )
        // Billing
        .route("/polka/webhooks", post(http::polka_webhook));

    let admin = Router::new().route("/metrics", get(http::metrics));

    Router::new()
        .nest("/api", api)
        .nest("/admin", admin)
        .nest_service("/app", fileserver)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("chirpy server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
