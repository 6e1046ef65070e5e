use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::upstream::ListingItem;

/// Placeholder the ratings provider uses for absent values; the front-end
/// already knows to swap in its own artwork for it.
pub const NOT_AVAILABLE: &str = "N/A";

/// A listing entry enriched with its IMDb id and a ready-to-use poster URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub item: ListingItem,
    pub imdb_id: Option<String>,
    pub poster_url: Option<String>,
}

impl MergedRecord {
    pub fn new(item: ListingItem, imdb_id: Option<String>, image_base_url: &str) -> Self {
        let poster_url = poster_url(image_base_url, &item.poster_path);
        Self {
            item,
            imdb_id: imdb_id.filter(|id| !id.is_empty()),
            poster_url,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        release_year(&self.item.release_date)
    }
}

/// Popular listing entry, shaped like a ratings-provider search hit so the
/// front-end can render both with the same card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularEntry {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster: String,
}

impl From<MergedRecord> for PopularEntry {
    fn from(record: MergedRecord) -> Self {
        let year = record
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            imdb_id: record.imdb_id,
            title: record.item.title,
            year,
            poster: record
                .poster_url
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularResponse {
    #[serde(rename = "Search")]
    pub search: Vec<PopularEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub id: Option<String>,
}

pub fn release_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

pub fn poster_url(image_base_url: &str, poster_path: &str) -> Option<String> {
    if poster_path.is_empty() {
        return None;
    }
    let base = image_base_url.trim_end_matches('/');
    if poster_path.starts_with('/') {
        Some(format!("{}{}", base, poster_path))
    } else {
        Some(format!("{}/{}", base, poster_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGES: &str = "https://image.tmdb.org/t/p/w500";

    fn item(release_date: &str, poster_path: &str) -> ListingItem {
        ListingItem {
            id: 872585,
            title: "Oppenheimer".to_string(),
            release_date: release_date.to_string(),
            poster_path: poster_path.to_string(),
        }
    }

    #[test]
    fn test_release_year() {
        assert_eq!(release_year("2023-07-19"), Some(2023));
        assert_eq!(release_year(""), None);
        assert_eq!(release_year("2023"), None);
        assert_eq!(release_year("not-a-date"), None);
    }

    #[test]
    fn test_poster_url() {
        assert_eq!(
            poster_url(IMAGES, "/8Gxv8gSFCU0XGDykEGv7zR1n2ua.jpg").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/8Gxv8gSFCU0XGDykEGv7zR1n2ua.jpg")
        );
        assert_eq!(
            poster_url("https://img.example/w500/", "x.jpg").as_deref(),
            Some("https://img.example/w500/x.jpg")
        );
        assert_eq!(poster_url(IMAGES, ""), None);
    }

    #[test]
    fn test_popular_entry() {
        let record = MergedRecord::new(
            item("2023-07-19", "/p.jpg"),
            Some("tt15398776".to_string()),
            IMAGES,
        );
        let entry = PopularEntry::from(record);
        assert_eq!(entry.imdb_id.as_deref(), Some("tt15398776"));
        assert_eq!(entry.title, "Oppenheimer");
        assert_eq!(entry.year, "2023");
        assert_eq!(entry.poster, "https://image.tmdb.org/t/p/w500/p.jpg");
    }

    #[test]
    fn test_popular_entry_missing_fields() {
        let record = MergedRecord::new(item("", ""), Some(String::new()), IMAGES);
        assert!(record.imdb_id.is_none());
        let entry = PopularEntry::from(record);
        assert_eq!(entry.year, NOT_AVAILABLE);
        assert_eq!(entry.poster, NOT_AVAILABLE);
    }

    #[test]
    fn test_merged_record_serializes_flat() {
        let record = MergedRecord::new(item("2023-07-19", "/p.jpg"), None, IMAGES);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 872585);
        assert_eq!(value["title"], "Oppenheimer");
        assert_eq!(value["poster_path"], "/p.jpg");
        assert!(value["imdb_id"].is_null());
        assert_eq!(value["poster_url"], "https://image.tmdb.org/t/p/w500/p.jpg");
    }
}
