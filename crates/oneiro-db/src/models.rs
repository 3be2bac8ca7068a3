/// Database row types. These map directly to SQLite rows and stay independent
/// of the oneiro-types API models. Ids and timestamps are kept as TEXT.

#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub avatar: Option<String>,
    pub is_pro: bool,
    pub streak: i64,
    pub avatar_changes_count: u32,
    /// `YYYY-MM-DD` of the last avatar change.
    pub avatar_updated_at: Option<String>,
}

/// A dream joined with its author and the viewer-dependent aggregates.
#[derive(Debug, Clone)]
pub struct DreamRow {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub title: String,
    pub description: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
    pub is_lucid: bool,
    pub language: String,
    pub analysis: Option<String>,
    pub dreamt_at: String,
    pub created_at: String,
    pub likes: i64,
    pub has_liked: bool,
    pub comment_count: i64,
}

/// Insert payload for a dream.
#[derive(Debug, Clone)]
pub struct NewDream {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub visibility: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub mood: Option<String>,
    pub is_lucid: bool,
    pub language: String,
    pub dreamt_at: String,
    pub created_at: String,
}

/// Partial update of an author's dream. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct DreamPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<Option<String>>,
    pub mood: Option<Option<String>>,
    pub is_lucid: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: String,
    pub dream_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub text: String,
    pub created_at: String,
}

/// Outcome of a profile update that may spend avatar-change quota.
#[derive(Debug)]
pub enum ProfileUpdate {
    Updated(ProfileRow),
    QuotaExceeded,
    NotFound,
}

/// Feed ordering, mirrored as a plain enum so this crate has no dependency on
/// the API types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrder {
    Recent,
    Popular,
}
