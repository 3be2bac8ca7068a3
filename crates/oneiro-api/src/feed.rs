use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use oneiro_db::models::FeedOrder;
use oneiro_types::api::{EXPLORE_LIMIT, ExploreQuery, FeedQuery, MAX_PAGE_SIZE};
use oneiro_types::models::{Dream, SortMode};

use crate::auth::AppState;
use crate::blocking;
use crate::convert::dream_from_row;
use crate::middleware::Viewer;

/// One page of the public feed in the requested language, with `has_liked`
/// resolved for the caller when signed in.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, StatusCode> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let order = match query.sort {
        SortMode::Recent => FeedOrder::Recent,
        SortMode::Popular => FeedOrder::Popular,
    };
    let language = query.lang.as_str();
    let offset = query.offset;
    let viewer_id = viewer.id_string();

    debug!(viewer = ?viewer_id, %language, sort = query.sort.as_str(), limit, offset, "Feed request");

    let rows = blocking(&state, move |db| {
        db.get_feed(viewer_id.as_deref(), language, order, limit, offset)
    })
    .await?;

    let dreams: Vec<Dream> = rows.into_iter().map(dream_from_row).collect();
    Ok(Json(dreams))
}

/// Free-text search over public dreams.
pub async fn explore(
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, StatusCode> {
    let viewer_id = viewer.id_string();
    let rows = blocking(&state, move |db| {
        db.search_public(viewer_id.as_deref(), &query.q, EXPLORE_LIMIT)
    })
    .await?;

    let dreams: Vec<Dream> = rows.into_iter().map(dream_from_row).collect();
    Ok(Json(dreams))
}
