use serde::{Deserialize, Serialize};

use crate::discovery::LookupPolicy;

pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    /// Timeout for outbound requests. Unset or 0 means the HTTP client default.
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// Bearer token (v4 read access token).
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_omdb_base_url")]
    pub base_url: String,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_omdb_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    #[serde(default = "default_popular_limit")]
    pub popular_limit: Option<usize>,
    #[serde(default)]
    pub trending_limit: Option<usize>,
    #[serde(default)]
    pub lookup_policy: LookupPolicy,
    /// Query used by the default movie listing.
    #[serde(default = "default_query")]
    pub default_query: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            popular_limit: default_popular_limit(),
            trending_limit: None,
            lookup_policy: LookupPolicy::default(),
            default_query: default_query(),
        }
    }
}

fn default_port() -> String {
    "8080".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_omdb_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_popular_limit() -> Option<usize> {
    Some(12)
}

fn default_query() -> String {
    "action".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let mut config = Self::from_yaml(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;
        config.apply_env(|name| std::env::var(name).ok());

        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.tmdb.api_key = non_blank(config.tmdb.api_key.take());
        config.omdb.api_key = non_blank(config.omdb.api_key.take());
        config.upstream_timeout_secs = config.upstream_timeout_secs.filter(|secs| *secs > 0);
        Ok(config)
    }

    /// Let the environment override the API credentials. Blank values are
    /// ignored so an exported-but-empty variable does not mask the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = non_blank(lookup(TMDB_API_KEY_ENV)) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(key) = non_blank(lookup(OMDB_API_KEY_ENV)) {
            self.omdb.api_key = Some(key);
        }
    }

    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.listen.tlscert, &self.listen.tlskey) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
