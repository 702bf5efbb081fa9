//! Chirpy Server Binary
//!
//! Reads `$CHIRPY_CONFIG` or `<config dir>/chirpy/config.toml` when present,
//! overlays the environment, and serves the API.

use std::sync::Arc;

use chirpy_core::ChirpyConfig;
use chirpy_server::{serve, AppState};
use tracing_subscriber::EnvFilter;

fn load_config() -> Result<ChirpyConfig, Box<dyn std::error::Error>> {
    // An explicit path must exist; the default one is optional
    let path = match std::env::var_os("CHIRPY_CONFIG") {
        Some(path) => Some(path.into()),
        None => ChirpyConfig::default_path().filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            ChirpyConfig::load_file(&path)?
        }
        None => ChirpyConfig::default(),
    };
    config.apply_process_env()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let state = Arc::new(AppState::from_config(&config)?);

    serve(&config.server.addr, state).await
}
