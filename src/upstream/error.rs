#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{provider} API responded with status {status_code}: {message}")]
    Status {
        provider: &'static str,
        status_code: u16,
        message: String,
    },
    #[error("failed to decode response at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The provider answered, but reported that nothing matched.
    #[error("{0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, UpstreamError>;
