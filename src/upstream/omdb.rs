use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{decode_response, RatingsProvider, Result, UpstreamError};
use crate::config::OmdbConfig;

const PROVIDER: &str = "OMDb";

/// A single hit of an OMDb `s=` search. Fields we do not model are kept
/// in `extra` so the payload round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "Poster", default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    /// Absent when OMDb answers without hits and without an `Error` member.
    #[serde(rename = "Search", default)]
    pub search: Vec<SearchHit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Plot", default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct OmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OmdbClient {
    pub fn new(client: Client, config: &OmdbConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, param: &str, value: &str) -> Result<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey(PROVIDER))?;
        debug!(param = param, value = value, "OMDb request");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[(param, value), ("apikey", api_key)])
            .send()
            .await?;
        let value: Value = decode_response(PROVIDER, response).await?;
        decode_reply(value)
    }
}

/// OMDb signals "not found" with a 200 and an `Error` member instead of a
/// result; map that to `NotFound` before decoding the typed payload.
fn decode_reply<T: DeserializeOwned>(value: Value) -> Result<T> {
    if let Some(message) = value.get("Error").and_then(Value::as_str) {
        return Err(UpstreamError::NotFound(message.to_string()));
    }
    serde_path_to_error::deserialize(value).map_err(|e| UpstreamError::Json {
        path: e.path().to_string(),
        source: e.into_inner(),
    })
}

#[async_trait]
impl RatingsProvider for OmdbClient {
    async fn search(&self, query: &str) -> Result<SearchPayload> {
        self.get("s", query).await
    }

    async fn title(&self, imdb_id: &str) -> Result<DetailRecord> {
        self.get("i", imdb_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_payload_round_trips() {
        let body = json!({
            "Search": [{
                "Title": "Oppenheimer",
                "Year": "2023",
                "imdbID": "tt15398776",
                "Type": "movie",
                "Poster": "https://m.media-amazon.com/images/M/x.jpg"
            }],
            "totalResults": "1",
            "Response": "True"
        });
        let payload: SearchPayload = decode_reply(body.clone()).unwrap();
        assert_eq!(payload.search.len(), 1);
        assert_eq!(payload.search[0].title, "Oppenheimer");
        assert_eq!(serde_json::to_value(&payload).unwrap(), body);
    }

    #[test]
    fn test_error_member_is_not_found() {
        let body = json!({"Response": "False", "Error": "Movie not found!"});
        let err = decode_reply::<SearchPayload>(body).unwrap_err();
        match err {
            UpstreamError::NotFound(msg) => assert_eq!(msg, "Movie not found!"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detail_keeps_unmodelled_fields() {
        let body = json!({
            "Title": "Oppenheimer",
            "imdbID": "tt15398776",
            "Director": "Christopher Nolan",
            "Ratings": [{"Source": "Internet Movie Database", "Value": "8.3/10"}],
            "Response": "True"
        });
        let detail: DetailRecord = decode_reply(body.clone()).unwrap();
        assert_eq!(detail.extra["Director"], "Christopher Nolan");
        assert!(detail.plot.is_none());
        assert_eq!(serde_json::to_value(&detail).unwrap(), body);
    }

    #[test]
    fn test_detail_without_title_is_rejected() {
        let body = json!({"imdbID": "tt1", "Response": "True"});
        let err = decode_reply::<DetailRecord>(body).unwrap_err();
        assert!(matches!(err, UpstreamError::Json { .. }));
    }
}
