use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use oneiro_ai::{DreamPrompt, prompts};
use oneiro_db::models::{DreamPatch, NewDream};
use oneiro_types::api::{CreateDreamRequest, ErrorResponse, UpdateDreamRequest};
use oneiro_types::models::{Dream, Language};

use crate::auth::AppState;
use crate::blocking;
use crate::convert::{dream_from_row, to_db_timestamp};
use crate::middleware::{AuthUser, Viewer};

pub async fn create_dream(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateDreamRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let title = non_blank(&req.title).ok_or(StatusCode::BAD_REQUEST)?;
    let description = non_blank(&req.description).ok_or(StatusCode::BAD_REQUEST)?;

    let mood = req.mood.as_deref().and_then(non_blank);
    let tags = if req.tags.iter().any(|t| !t.trim().is_empty()) {
        clean_tags(req.tags)
    } else {
        default_tags(mood.as_deref(), req.is_lucid, req.language)
    };

    let now = Utc::now();
    let dream_id = Uuid::new_v4();
    let new = NewDream {
        id: dream_id.to_string(),
        author_id: claims.sub.to_string(),
        title,
        description,
        visibility: req.visibility.as_str().to_string(),
        tags,
        image_url: req.image_url.as_deref().and_then(non_blank),
        mood,
        is_lucid: req.is_lucid,
        language: req.language.as_str().to_string(),
        dreamt_at: to_db_timestamp(req.dreamt_at.unwrap_or(now)),
        created_at: to_db_timestamp(now),
    };

    let id = new.id.clone();
    let author = new.author_id.clone();
    let row = blocking(&state, move |db| {
        db.insert_dream(&new)?;
        db.get_dream(&id, Some(&author))
    })
    .await?
    .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    info!(%dream_id, author_id = %claims.sub, "Dream recorded");

    Ok((StatusCode::CREATED, Json(dream_from_row(row))))
}

/// A private dream is reported as missing to anyone but its author.
pub async fn get_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, StatusCode> {
    let dream = load_visible(&state, dream_id, viewer.id_string()).await?;
    Ok(Json(dream))
}

pub async fn update_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
    Json(req): Json<UpdateDreamRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let title = req
        .title
        .as_deref()
        .map(|t| non_blank(t).ok_or(StatusCode::BAD_REQUEST))
        .transpose()?;
    let description = req
        .description
        .as_deref()
        .map(|d| non_blank(d).ok_or(StatusCode::BAD_REQUEST))
        .transpose()?;

    let patch = DreamPatch {
        title,
        description,
        visibility: req.visibility.map(|v| v.as_str().to_string()),
        tags: req.tags.map(clean_tags),
        // Empty strings clear the optional columns
        image_url: req.image_url.map(|u| non_blank(&u)),
        mood: req.mood.map(|m| non_blank(&m)),
        is_lucid: req.is_lucid,
    };

    let did = dream_id.to_string();
    let uid = claims.sub.to_string();
    let row = blocking(&state, move |db| {
        if !db.update_dream(&did, &uid, &patch)? {
            return Ok(None);
        }
        db.get_dream(&did, Some(&uid))
    })
    .await?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(dream_from_row(row)))
}

pub async fn delete_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> Result<StatusCode, StatusCode> {
    let did = dream_id.to_string();
    let uid = claims.sub.to_string();
    let deleted = blocking(&state, move |db| db.delete_dream(&did, &uid)).await?;

    if !deleted {
        return Err(StatusCode::NOT_FOUND);
    }
    info!(%dream_id, author_id = %claims.sub, "Dream deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Ask the interpreter for an analysis of the caller's own dream and store it.
pub async fn analyze_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> Result<Response, StatusCode> {
    let interpreter = state
        .interpreter
        .clone()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let dream = load_visible(&state, dream_id, Some(claims.sub.to_string())).await?;
    if dream.author_id != claims.sub {
        return Err(StatusCode::NOT_FOUND);
    }

    let prompt = DreamPrompt {
        title: dream.title.clone(),
        description: dream.description.clone(),
        mood: dream.mood.clone(),
        is_lucid: dream.is_lucid,
        language: dream.language,
    };

    let analysis = match interpreter.interpret(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(%dream_id, "Analysis failed: {}", e);
            let message = match e {
                oneiro_ai::AiError::EmptyReply => prompts::empty_reply_message(dream.language),
                _ => prompts::unreachable_message(dream.language),
            };
            let body = ErrorResponse { error: message.to_string() };
            return Ok((StatusCode::BAD_GATEWAY, Json(body)).into_response());
        }
    };

    let did = dream_id.to_string();
    let uid = claims.sub.to_string();
    let stored = analysis.clone();
    let saved = blocking(&state, move |db| db.set_analysis(&did, &uid, &stored)).await?;
    if !saved {
        // Deleted while the model was thinking
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(Dream {
        analysis: Some(analysis),
        ..dream
    })
    .into_response())
}

pub(crate) async fn load_visible(
    state: &AppState,
    dream_id: Uuid,
    viewer: Option<String>,
) -> Result<Dream, StatusCode> {
    let did = dream_id.to_string();
    let row = blocking(state, move |db| db.get_dream(&did, viewer.as_deref()))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(dream_from_row(row))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Tags used when the author supplied none: the mood and a lucidity marker.
fn default_tags(mood: Option<&str>, is_lucid: bool, language: Language) -> Vec<String> {
    let lucid = is_lucid.then(|| match language {
        Language::Pt => "Lúcido",
        _ => "Lucid",
    });
    mood.into_iter().chain(lucid).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tags_follow_mood_and_lucidity() {
        assert_eq!(default_tags(Some("Happy"), true, Language::Pt), vec!["Happy", "Lúcido"]);
        assert_eq!(default_tags(None, true, Language::En), vec!["Lucid"]);
        assert!(default_tags(None, false, Language::Es).is_empty());
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = vec![" Sea ".to_string(), "".to_string(), "Sea".to_string(), "Moon".to_string()];
        assert_eq!(clean_tags(tags), vec!["Sea", "Moon"]);
    }
}
