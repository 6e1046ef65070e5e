use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{debug, info};

use super::aggregate::aggregate;
use super::types::*;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::upstream::{
    self, DetailRecord, ListingItem, MetadataProvider, SearchHit, SearchPayload, UpstreamError,
};

const IMDB_ID_PREFIX: &str = "tt";

pub async fn popular_movies(State(state): State<AppState>) -> ApiResult<Json<PopularResponse>> {
    const CONTEXT: &str = "Failed to fetch popular movies";

    let items = state
        .metadata
        .popular_movies()
        .await
        .map_err(|e| ApiError::upstream(e, CONTEXT))?;
    let records = enrich(&state, items, state.config.listing.popular_limit)
        .await
        .map_err(|e| ApiError::upstream(e, CONTEXT))?;

    info!(count = records.len(), "popular listing");
    Ok(Json(PopularResponse {
        search: records.into_iter().map(PopularEntry::from).collect(),
    }))
}

pub async fn trending_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<MergedRecord>>> {
    const CONTEXT: &str = "Failed to load trending movies";

    let items = state
        .metadata
        .trending_movies()
        .await
        .map_err(|e| ApiError::upstream(e, CONTEXT))?;
    let records = enrich(&state, items, state.config.listing.trending_limit)
        .await
        .map_err(|e| ApiError::upstream(e, CONTEXT))?;

    info!(count = records.len(), "trending listing");
    Ok(Json(records))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPayload>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?;

    debug!(query = query, "search");
    let payload = state
        .ratings
        .search(query)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch search results"))?;
    Ok(Json(payload))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Query(params): Query<DetailParams>,
) -> ApiResult<Json<DetailRecord>> {
    let id = params
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Movie ID is required"))?;
    if !id.starts_with(IMDB_ID_PREFIX) {
        return Err(ApiError::bad_request("Invalid IMDB ID format"));
    }

    let detail = state
        .ratings
        .title(id)
        .await
        .map_err(|e| ApiError::upstream(e, "Failed to fetch movie details"))?;
    Ok(Json(detail))
}

/// Search hits for the configured default query, as a bare array.
pub async fn default_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<SearchHit>>> {
    match state.ratings.search(&state.config.listing.default_query).await {
        Ok(payload) => Ok(Json(payload.search)),
        Err(UpstreamError::NotFound(_)) => Ok(Json(Vec::new())),
        Err(UpstreamError::Status {
            status_code: 404, ..
        }) => Err(ApiError::not_found("No movies found")),
        Err(e) => Err(ApiError::upstream(e, "Failed to fetch movies")),
    }
}

async fn enrich(
    state: &AppState,
    items: Vec<ListingItem>,
    limit: Option<usize>,
) -> upstream::Result<Vec<MergedRecord>> {
    let metadata: &dyn MetadataProvider = state.metadata.as_ref();
    aggregate(
        items,
        limit,
        state.config.listing.lookup_policy,
        &state.config.tmdb.image_base_url,
        |id| async move { metadata.external_ids(id).await.map(|ids| ids.imdb_id) },
    )
    .await
}
