use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Language, SortMode, Visibility};

// -- JWT Claims --

/// JWT claims issued by the auth routes and checked by the API middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Feed --

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const EXPLORE_LIMIT: u32 = 20;

/// Parameters of the feed retrieval procedure. The viewer is implied by the
/// bearer token, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub lang: Language,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExploreQuery {
    #[serde(default)]
    pub q: String,
}

// -- Likes --

/// Authoritative like state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub likes: i64,
}

// -- Dreams --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDreamRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub mood: Option<String>,
    #[serde(default)]
    pub is_lucid: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub language: Language,
    pub dreamt_at: Option<DateTime<Utc>>,
}

/// Partial edit. Absent fields are left untouched; `Some(None)` is not
/// distinguishable from absence, so optional fields are cleared with an
/// empty string.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDreamRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub mood: Option<String>,
    pub is_lucid: Option<bool>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

// -- Comments --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub text: String,
}

// -- AI --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagsRequest {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub prompt: String,
    pub url: String,
}

/// Body of non-2xx responses that carry a user-facing message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Profile --

pub const MAX_AVATAR_CHANGES_PER_DAY: u32 = 3;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: chrono::NaiveDate,
    pub count: usize,
}

/// Aggregates over one author's journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamStats {
    pub total: usize,
    pub top_tags: Vec<(String, usize)>,
    pub max_tag_count: usize,
    pub positive_count: usize,
    pub nightmare_count: usize,
    pub lucid_pct: u8,
    pub morning_pct: u8,
    pub weekly: Vec<DayCount>,
    pub max_daily_dreams: usize,
}
