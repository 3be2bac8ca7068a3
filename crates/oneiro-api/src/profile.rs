use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{info, warn};

use oneiro_db::models::ProfileUpdate;
use oneiro_types::api::{DreamStats, MAX_AVATAR_CHANGES_PER_DAY, UpdateProfileRequest};
use oneiro_types::models::{Dream, Profile};

use crate::auth::AppState;
use crate::blocking;
use crate::convert::{dream_from_row, profile_from_row};
use crate::middleware::AuthUser;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Profile>, StatusCode> {
    let uid = claims.sub.to_string();
    let row = blocking(&state, move |db| db.get_profile_by_id(&uid))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(profile_from_row(row)))
}

/// Rename and/or change avatar. Avatar changes are limited per UTC day.
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, StatusCode> {
    let name = match req.name {
        Some(n) if n.trim().is_empty() => return Err(StatusCode::BAD_REQUEST),
        Some(n) => Some(n.trim().to_string()),
        None => None,
    };
    let avatar = match req.avatar {
        Some(a) if a.trim().is_empty() => return Err(StatusCode::BAD_REQUEST),
        Some(a) => Some(a.trim().to_string()),
        None => None,
    };

    let uid = claims.sub.to_string();
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let outcome = blocking(&state, move |db| {
        db.update_profile(
            &uid,
            name.as_deref(),
            avatar.as_deref(),
            &today,
            MAX_AVATAR_CHANGES_PER_DAY,
        )
    })
    .await?;

    match outcome {
        ProfileUpdate::Updated(row) => {
            info!(user_id = %claims.sub, "Profile updated");
            Ok(Json(profile_from_row(row)))
        }
        ProfileUpdate::QuotaExceeded => {
            warn!(user_id = %claims.sub, "Avatar change quota exceeded");
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
        ProfileUpdate::NotFound => Err(StatusCode::NOT_FOUND),
    }
}

/// The caller's whole journal, private entries included, newest first.
pub async fn my_dreams(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Dream>>, StatusCode> {
    Ok(Json(load_journal(&state, &claims.sub.to_string()).await?))
}

/// Journal aggregates; `null` when the journal is empty.
pub async fn my_stats(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Option<DreamStats>>, StatusCode> {
    let dreams = load_journal(&state, &claims.sub.to_string()).await?;
    let today = Utc::now().date_naive();
    Ok(Json(oneiro_ai::stats::compute(&dreams, today)))
}

async fn load_journal(state: &AppState, author_id: &str) -> Result<Vec<Dream>, StatusCode> {
    let aid = author_id.to_string();
    let rows = blocking(state, move |db| db.get_dreams_by_author(&aid)).await?;
    Ok(rows.into_iter().map(dream_from_row).collect())
}
