//! Row-to-API conversions. Rows hold TEXT ids and timestamps; corrupt values
//! are logged and replaced with defaults rather than failing the whole page.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;
use uuid::Uuid;

use oneiro_db::models::{CommentRow, DreamRow, ProfileRow};
use oneiro_types::models::{Comment, Dream, Language, Profile, Visibility};

/// Canonical storage format for timestamps. Fixed-width, so TEXT ordering in
/// SQLite matches chronological ordering.
pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str, what: &str, owner: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite defaults are "YYYY-MM-DD HH:MM:SS" without timezone
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}' on '{}': {}", what, raw, owner, e);
            DateTime::default()
        })
}

fn parse_uuid(raw: &str, what: &str, owner: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", what, raw, owner, e);
        Uuid::default()
    })
}

pub fn dream_from_row(row: DreamRow) -> Dream {
    let visibility = row.visibility.parse().unwrap_or_else(|e| {
        warn!("Corrupt visibility on dream '{}': {}", row.id, e);
        Visibility::Private
    });

    Dream {
        id: parse_uuid(&row.id, "id", &row.id),
        author_id: parse_uuid(&row.author_id, "author_id", &row.id),
        created_at: parse_timestamp(&row.created_at, "created_at", &row.id),
        dreamt_at: parse_timestamp(&row.dreamt_at, "dreamt_at", &row.id),
        language: Language::from_locale(&row.language),
        author_name: row.author_name,
        author_avatar: row.author_avatar,
        title: row.title,
        description: row.description,
        visibility,
        tags: row.tags,
        image_url: row.image_url,
        mood: row.mood,
        is_lucid: row.is_lucid,
        likes: row.likes,
        has_liked: row.has_liked,
        comment_count: row.comment_count,
        analysis: row.analysis,
    }
}

pub fn comment_from_row(row: CommentRow) -> Comment {
    Comment {
        id: parse_uuid(&row.id, "id", &row.id),
        dream_id: parse_uuid(&row.dream_id, "dream_id", &row.id),
        author_id: parse_uuid(&row.author_id, "author_id", &row.id),
        created_at: parse_timestamp(&row.created_at, "created_at", &row.id),
        author_name: row.author_name,
        author_avatar: row.author_avatar,
        text: row.text,
    }
}

pub fn profile_from_row(row: ProfileRow) -> Profile {
    let avatar_updated_at = row
        .avatar_updated_at
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

    Profile {
        id: parse_uuid(&row.id, "id", &row.username),
        username: row.username,
        name: row.name,
        avatar: row.avatar,
        is_pro: row.is_pro,
        streak: row.streak,
        avatar_changes_count: row.avatar_changes_count,
        avatar_updated_at,
    }
}
