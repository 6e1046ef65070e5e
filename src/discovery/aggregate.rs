use std::future::Future;

use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::MergedRecord;
use crate::upstream::{ListingItem, Result};

/// What to do when the IMDb id lookup for a single title fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Fail the whole listing.
    #[default]
    AllOrNothing,
    /// Keep the title and leave its IMDb id empty.
    PerItem,
}

/// Enrich up to `max_items` listing entries with the id returned by
/// `lookup`, running all lookups concurrently. Output order follows input
/// order regardless of completion order.
pub async fn aggregate<F, Fut>(
    items: Vec<ListingItem>,
    max_items: Option<usize>,
    policy: LookupPolicy,
    image_base_url: &str,
    lookup: F,
) -> Result<Vec<MergedRecord>>
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    let items: Vec<ListingItem> = match max_items {
        Some(max) => items.into_iter().take(max).collect(),
        None => items,
    };

    let lookups = items.iter().map(|item| lookup(item.id));
    let ids: Vec<Option<String>> = match policy {
        LookupPolicy::AllOrNothing => try_join_all(lookups).await?,
        LookupPolicy::PerItem => join_all(lookups)
            .await
            .into_iter()
            .zip(&items)
            .map(|(result, item)| {
                result.unwrap_or_else(|e| {
                    warn!(movie_id = item.id, error = %e, "IMDb id lookup failed");
                    None
                })
            })
            .collect(),
    };

    Ok(items
        .into_iter()
        .zip(ids)
        .map(|(item, imdb_id)| MergedRecord::new(item, imdb_id, image_base_url))
        .collect())
}
