pub mod config;
pub mod discovery;
pub mod error;
pub mod history;
pub mod middleware;
pub mod server;
pub mod upstream;

use std::net::SocketAddr;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let config = config::Config::from_file(config_path)?;

    info!("Using config file: {}", config_path);
    if debug_logs {
        info!("Debug logging enabled");
    }
    if config.tmdb.api_key.is_none() {
        warn!("No TMDB API key configured, listing routes will fail");
    }
    if config.omdb.api_key.is_none() {
        warn!("No OMDb API key configured, search and detail routes will fail");
    }
    info!(
        popular_limit = ?config.listing.popular_limit,
        trending_limit = ?config.listing.trending_limit,
        lookup_policy = ?config.listing.lookup_policy,
        "Listing settings"
    );

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls_paths = config
        .tls_paths()
        .map(|(cert, key)| (cert.to_string(), key.to_string()));

    let state = server::AppState::from_config(config)?;
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls_paths {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
