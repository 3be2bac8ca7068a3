use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use oneiro_types::api::CreateCommentRequest;
use oneiro_types::models::Comment;

use crate::auth::AppState;
use crate::blocking;
use crate::convert::{comment_from_row, to_db_timestamp};
use crate::middleware::{AuthUser, Viewer};

const MAX_COMMENT_LEN: usize = 2000;

/// Comments of a dream, newest first. Only readable where the dream is.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Json<Vec<Comment>>, StatusCode> {
    let did = dream_id.to_string();
    let viewer = viewer.id_string();

    let rows = blocking(&state, move |db| {
        if db.get_dream(&did, viewer.as_deref())?.is_none() {
            return Ok(None);
        }
        db.get_comments(&did).map(Some)
    })
    .await?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(rows.into_iter().map(comment_from_row).collect()))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let text = req.text.trim().to_string();
    if text.is_empty() || text.chars().count() > MAX_COMMENT_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    let comment_id = Uuid::new_v4();
    let id = comment_id.to_string();
    let did = dream_id.to_string();
    let uid = claims.sub.to_string();
    let created_at = to_db_timestamp(Utc::now());

    let row = blocking(&state, move |db| {
        if db.get_dream(&did, Some(&uid))?.is_none() {
            return Ok(None);
        }
        db.insert_comment(&id, &did, &uid, &text, &created_at)?;
        db.get_comment(&id)
    })
    .await?
    .ok_or(StatusCode::NOT_FOUND)?;

    info!(%comment_id, %dream_id, author_id = %claims.sub, "Comment posted");

    Ok((StatusCode::CREATED, Json(comment_from_row(row))))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> Result<StatusCode, StatusCode> {
    let id = comment_id.to_string();
    let uid = claims.sub.to_string();

    if !blocking(&state, move |db| db.delete_comment(&id, &uid)).await? {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}
