use axum::{extract::Request, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::upstream::{MetadataProvider, OmdbClient, RatingsProvider, TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub ratings: Arc<dyn RatingsProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        metadata: Arc<dyn MetadataProvider>,
        ratings: Arc<dyn RatingsProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metadata,
            ratings,
        }
    }

    /// Build the upstream clients described by `config`. Both share one
    /// connection pool.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.upstream_timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let metadata = Arc::new(TmdbClient::new(client.clone(), &config.tmdb));
        let ratings = Arc::new(OmdbClient::new(client, &config.omdb));
        Ok(Self::new(config, metadata, ratings))
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/popular", get(crate::discovery::popular_movies))
        .route("/api/trending", get(crate::discovery::trending_movies))
        .route("/api/search", get(crate::discovery::search_movies))
        .route("/api/movie", get(crate::discovery::movie_details))
        .route("/api/movies", get(crate::discovery::default_movies));

    let mut router = Router::new()
        .route("/robots.txt", get(robots_txt_handler))
        .route("/health", get(health_handler))
        .merge(api_routes)
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        router = router.fallback_service(ServeDir::new(appdir));
    }

    let app = router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Path rewriting has to happen before routing, so it wraps the whole app.
    Router::new()
        .fallback_service(app)
        .layer(axum::middleware::from_fn(crate::middleware::normalize_path))
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(axum::http::header::CACHE_CONTROL, "no-cache, no-store")],
        "Healthy",
    )
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // CORS preflight for paths without a route
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
