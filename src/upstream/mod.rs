pub mod error;
pub mod omdb;
pub mod tmdb;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use error::{Result, UpstreamError};
pub use omdb::{DetailRecord, OmdbClient, SearchHit, SearchPayload};
pub use tmdb::{ExternalIds, ListingItem, TmdbClient};

/// Source of title listings and cross-provider identifiers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn popular_movies(&self) -> Result<Vec<ListingItem>>;
    async fn trending_movies(&self) -> Result<Vec<ListingItem>>;
    async fn external_ids(&self, movie_id: i64) -> Result<ExternalIds>;
}

/// Title search and per-title details keyed by IMDb id.
#[async_trait]
pub trait RatingsProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchPayload>;
    async fn title(&self, imdb_id: &str) -> Result<DetailRecord>;
}

pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(UpstreamError::Status {
            provider,
            status_code: status.as_u16(),
            message: body,
        });
    }
    decode_body(&body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        UpstreamError::Json {
            path: e.path().to_string(),
            source: e.into_inner(),
        }
    })?;
    deserializer.end().map_err(|source| UpstreamError::Json {
        path: ".".to_string(),
        source,
    })?;
    Ok(value)
}
