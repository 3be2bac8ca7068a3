use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use oneiro_ai::image::{pollinations_url, random_seed};
use oneiro_types::api::{ImageRequest, ImageResponse, TagsRequest, TagsResponse};

use crate::auth::AppState;
use crate::blocking;
use crate::middleware::AuthUser;

/// Suggest tags for a draft description.
pub async fn suggest_tags(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<TagsRequest>,
) -> Result<Json<TagsResponse>, StatusCode> {
    let interpreter = state
        .interpreter
        .clone()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let description = req.description.trim();
    if description.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let tags = interpreter.generate_tags(description).await;
    Ok(Json(TagsResponse { tags }))
}

/// Build an illustration for a draft. Pro accounts only.
pub async fn generate_image(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, StatusCode> {
    let interpreter = state
        .interpreter
        .clone()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let title = req.title.trim();
    let description = req.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let uid = claims.sub.to_string();
    let profile = blocking(&state, move |db| db.get_profile_by_id(&uid))
        .await?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !profile.is_pro {
        return Err(StatusCode::FORBIDDEN);
    }

    let prompt = interpreter.image_prompt(title, description).await;
    let url = pollinations_url(&prompt, random_seed());
    debug!(user_id = %claims.sub, "Image prompt generated");

    Ok(Json(ImageResponse { prompt, url }))
}
