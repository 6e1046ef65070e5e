use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::{decode_response, MetadataProvider, Result, UpstreamError};
use crate::config::TmdbConfig;

const PROVIDER: &str = "TMDB";

/// One entry of a TMDB movie listing, as the listing endpoints return it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingItem {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub poster_path: String,
}

#[derive(Debug, Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let token = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey(PROVIDER))?;
        let url = self.url(path);
        debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        decode_response(PROVIDER, response).await
    }

    async fn listing(&self, path: &str) -> Result<Vec<ListingItem>> {
        let page: Paginated<ListingItem> = self
            .get(path, &[("language", self.language.as_str()), ("page", "1")])
            .await?;
        Ok(page.results)
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    /// GET /movie/popular
    async fn popular_movies(&self) -> Result<Vec<ListingItem>> {
        self.listing("/movie/popular").await
    }

    /// GET /trending/movie/day
    async fn trending_movies(&self) -> Result<Vec<ListingItem>> {
        self.listing("/trending/movie/day").await
    }

    /// GET /movie/{movie_id}/external_ids
    ///
    /// A 4xx reply for one title means TMDB has no ids for it; that title
    /// gets no IMDb id instead of failing the listing.
    async fn external_ids(&self, movie_id: i64) -> Result<ExternalIds> {
        match self
            .get(&format!("/movie/{}/external_ids", movie_id), &[])
            .await
        {
            Err(UpstreamError::Status { status_code, .. }) if (400..500).contains(&status_code) => {
                warn!(movie_id, status_code, "No external ids for title");
                Ok(ExternalIds::default())
            }
            other => other,
        }
    }
}
