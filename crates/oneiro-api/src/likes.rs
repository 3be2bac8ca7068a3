use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use oneiro_types::api::ToggleLikeResponse;

use crate::auth::AppState;
use crate::blocking;
use crate::middleware::AuthUser;

/// Flip the caller's like on a dream and report the authoritative state.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, StatusCode> {
    let did = dream_id.to_string();
    let uid = claims.sub.to_string();

    let (liked, likes) = blocking(&state, move |db| db.toggle_like(&did, &uid))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;

    debug!(%dream_id, user_id = %claims.sub, liked, likes, "Like toggled");

    Ok(Json(ToggleLikeResponse { liked, likes }))
}
