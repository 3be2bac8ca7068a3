use crate::Database;
use crate::models::{
    CommentRow, DreamPatch, DreamRow, FeedOrder, NewDream, ProfileRow, ProfileUpdate,
};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::debug;

/// Columns shared by every dream read. `?1` is always the viewer id (or NULL),
/// which drives `has_liked`.
const DREAM_SELECT: &str = "
    SELECT d.id, d.author_id, p.name, p.avatar, d.title, d.description, d.visibility,
           d.tags, d.image_url, d.mood, d.is_lucid, d.language, d.analysis,
           d.dreamt_at, d.created_at,
           (SELECT COUNT(*) FROM interactions i WHERE i.dream_id = d.id) AS likes,
           EXISTS (SELECT 1 FROM interactions i WHERE i.dream_id = d.id AND i.user_id = ?1) AS has_liked,
           (SELECT COUNT(*) FROM comments c WHERE c.dream_id = d.id) AS comment_count
    FROM dreams d
    JOIN profiles p ON p.id = d.author_id";

impl Database {
    // -- Profiles --

    pub fn create_profile(
        &self,
        id: &str,
        username: &str,
        name: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO profiles (id, username, name, password, avatar) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, username, name, password_hash, avatar],
            );
            match inserted {
                Ok(_) => Ok(true),
                // Username already taken
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_profile_by_username(&self, username: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, "username", username))
    }

    pub fn get_profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, "id", id))
    }

    /// Update name and/or avatar. An avatar that differs from the current one
    /// spends one unit of the daily quota; the counter restarts when the last
    /// change happened on a day other than `today`.
    pub fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
        today: &str,
        max_avatar_changes: u32,
    ) -> Result<ProfileUpdate> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(current) = query_profile(&tx, "id", id)? else {
                return Ok(ProfileUpdate::NotFound);
            };

            let used_today = if current.avatar_updated_at.as_deref() == Some(today) {
                current.avatar_changes_count
            } else {
                0
            };

            let avatar_changed = avatar.is_some_and(|a| current.avatar.as_deref() != Some(a));
            let (changes, updated_at) = if avatar_changed {
                if used_today >= max_avatar_changes {
                    return Ok(ProfileUpdate::QuotaExceeded);
                }
                (used_today + 1, Some(today.to_string()))
            } else {
                (current.avatar_changes_count, current.avatar_updated_at.clone())
            };

            tx.execute(
                "UPDATE profiles
                 SET name = COALESCE(?2, name),
                     avatar = COALESCE(?3, avatar),
                     avatar_changes_count = ?4,
                     avatar_updated_at = ?5
                 WHERE id = ?1",
                params![id, name, avatar, changes, updated_at],
            )?;

            let updated = query_profile(&tx, "id", id)?;
            tx.commit()?;

            Ok(updated.map_or(ProfileUpdate::NotFound, ProfileUpdate::Updated))
        })
    }

    // -- Dreams --

    pub fn insert_dream(&self, dream: &NewDream) -> Result<()> {
        let tags = serde_json::to_string(&dream.tags)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO dreams (id, author_id, title, description, visibility, tags, image_url,
                                     mood, is_lucid, language, dreamt_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    dream.id,
                    dream.author_id,
                    dream.title,
                    dream.description,
                    dream.visibility,
                    tags,
                    dream.image_url,
                    dream.mood,
                    dream.is_lucid,
                    dream.language,
                    dream.dreamt_at,
                    dream.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Fetch a dream if `viewer` may see it: public dreams are visible to
    /// everyone, private ones only to their author.
    pub fn get_dream(&self, id: &str, viewer: Option<&str>) -> Result<Option<DreamRow>> {
        self.with_conn(|conn| query_visible_dream(conn, id, viewer))
    }

    /// Apply a patch to a dream owned by `author_id`. Returns false when the
    /// dream does not exist or belongs to someone else.
    pub fn update_dream(&self, id: &str, author_id: &str, patch: &DreamPatch) -> Result<bool> {
        let tags = patch.tags.as_ref().map(serde_json::to_string).transpose()?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owned: bool = tx
                .query_row(
                    "SELECT 1 FROM dreams WHERE id = ?1 AND author_id = ?2",
                    params![id, author_id],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if !owned {
                return Ok(false);
            }

            tx.execute(
                "UPDATE dreams
                 SET title = COALESCE(?2, title),
                     description = COALESCE(?3, description),
                     visibility = COALESCE(?4, visibility),
                     tags = COALESCE(?5, tags),
                     is_lucid = COALESCE(?6, is_lucid)
                 WHERE id = ?1",
                params![
                    id,
                    patch.title,
                    patch.description,
                    patch.visibility,
                    tags,
                    patch.is_lucid,
                ],
            )?;

            // Nullable columns can be cleared, so they are written separately
            if let Some(image_url) = &patch.image_url {
                tx.execute("UPDATE dreams SET image_url = ?2 WHERE id = ?1", params![id, image_url])?;
            }
            if let Some(mood) = &patch.mood {
                tx.execute("UPDATE dreams SET mood = ?2 WHERE id = ?1", params![id, mood])?;
            }

            tx.commit()?;
            Ok(true)
        })
    }

    /// Hard delete. Comments and likes go with it via ON DELETE CASCADE.
    pub fn delete_dream(&self, id: &str, author_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM dreams WHERE id = ?1 AND author_id = ?2",
                params![id, author_id],
            )?;
            Ok(n > 0)
        })
    }

    pub fn set_analysis(&self, id: &str, author_id: &str, analysis: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE dreams SET analysis = ?3 WHERE id = ?1 AND author_id = ?2",
                params![id, author_id, analysis],
            )?;
            Ok(n > 0)
        })
    }

    /// One page of the public feed for a language.
    ///
    /// Private dreams are excluded for every viewer, including their author.
    pub fn get_feed(
        &self,
        viewer: Option<&str>,
        language: &str,
        order: FeedOrder,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DreamRow>> {
        let order_by = match order {
            FeedOrder::Recent => "d.created_at DESC, d.rowid DESC",
            FeedOrder::Popular => "likes DESC, d.created_at DESC, d.rowid DESC",
        };
        let sql = format!(
            "{DREAM_SELECT}
             WHERE d.visibility = 'public' AND d.language = ?2
             ORDER BY {order_by}
             LIMIT ?3 OFFSET ?4"
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![viewer, language, limit, offset], map_dream)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            debug!(language, ?order, limit, offset, returned = rows.len(), "feed page");
            Ok(rows)
        })
    }

    /// Case-insensitive substring search over public titles and descriptions,
    /// newest first. An empty query matches everything.
    pub fn search_public(&self, viewer: Option<&str>, query: &str, limit: u32) -> Result<Vec<DreamRow>> {
        let pattern = format!("%{}%", escape_like(&query.trim().to_lowercase()));
        let sql = format!(
            "{DREAM_SELECT}
             WHERE d.visibility = 'public'
               AND (unicode_lower(d.title) LIKE ?2 ESCAPE '\\'
                    OR unicode_lower(d.description) LIKE ?2 ESCAPE '\\')
             ORDER BY d.created_at DESC, d.rowid DESC
             LIMIT ?3"
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![viewer, pattern, limit], map_dream)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every dream by an author, private ones included, newest dream date first.
    pub fn get_dreams_by_author(&self, author_id: &str) -> Result<Vec<DreamRow>> {
        let sql = format!(
            "{DREAM_SELECT}
             WHERE d.author_id = ?1
             ORDER BY d.dreamt_at DESC, d.rowid DESC"
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![author_id], map_dream)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns `(liked, likes)` after the change, or `None` if the dream is
    /// not visible to `user_id`.
    pub fn toggle_like(&self, dream_id: &str, user_id: &str) -> Result<Option<(bool, i64)>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if query_visible_dream(&tx, dream_id, Some(user_id))?.is_none() {
                return Ok(None);
            }

            let removed = tx.execute(
                "DELETE FROM interactions WHERE user_id = ?1 AND dream_id = ?2",
                params![user_id, dream_id],
            )?;
            let liked = removed == 0;
            if liked {
                tx.execute(
                    "INSERT INTO interactions (user_id, dream_id) VALUES (?1, ?2)",
                    params![user_id, dream_id],
                )?;
            }

            let likes = count_likes(&tx, dream_id)?;
            tx.commit()?;
            Ok(Some((liked, likes)))
        })
    }

    #[cfg(test)]
    pub fn like_count(&self, dream_id: &str) -> Result<i64> {
        self.with_conn(|conn| count_likes(conn, dream_id))
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        dream_id: &str,
        author_id: &str,
        text: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, dream_id, author_id, text, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, dream_id, author_id, text, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT c.id, c.dream_id, c.author_id, p.name, p.avatar, c.text, c.created_at
                     FROM comments c
                     JOIN profiles p ON p.id = c.author_id
                     WHERE c.id = ?1",
                    [id],
                    map_comment,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Comments of a dream, newest first.
    pub fn get_comments(&self, dream_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.dream_id, c.author_id, p.name, p.avatar, c.text, c.created_at
                 FROM comments c
                 JOIN profiles p ON p.id = c.author_id
                 WHERE c.dream_id = ?1
                 ORDER BY c.created_at DESC, c.rowid DESC",
            )?;
            let rows = stmt
                .query_map([dream_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_comment(&self, id: &str, author_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND author_id = ?2",
                params![id, author_id],
            )?;
            Ok(n > 0)
        })
    }
}

fn query_profile(conn: &Connection, column: &str, value: &str) -> Result<Option<ProfileRow>> {
    // `column` is only ever one of two literals chosen above
    let sql = format!(
        "SELECT id, username, name, password, avatar, is_pro, streak, avatar_changes_count, avatar_updated_at
         FROM profiles WHERE {column} = ?1"
    );
    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(ProfileRow {
                id: row.get(0)?,
                username: row.get(1)?,
                name: row.get(2)?,
                password: row.get(3)?,
                avatar: row.get(4)?,
                is_pro: row.get(5)?,
                streak: row.get(6)?,
                avatar_changes_count: row.get(7)?,
                avatar_updated_at: row.get(8)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn query_visible_dream(conn: &Connection, id: &str, viewer: Option<&str>) -> Result<Option<DreamRow>> {
    let sql = format!(
        "{DREAM_SELECT}
         WHERE d.id = ?2 AND (d.visibility = 'public' OR d.author_id = ?1)"
    );
    let row = conn.query_row(&sql, params![viewer, id], map_dream).optional()?;
    Ok(row)
}

fn count_likes(conn: &Connection, dream_id: &str) -> Result<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM interactions WHERE dream_id = ?1",
        [dream_id],
        |row| row.get(0),
    )?;
    Ok(n)
}

fn map_dream(row: &Row<'_>) -> rusqlite::Result<DreamRow> {
    let raw_tags: String = row.get(7)?;
    let tags = serde_json::from_str(&raw_tags).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(DreamRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_name: row.get(2)?,
        author_avatar: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        visibility: row.get(6)?,
        tags,
        image_url: row.get(8)?,
        mood: row.get(9)?,
        is_lucid: row.get(10)?,
        language: row.get(11)?,
        analysis: row.get(12)?,
        dreamt_at: row.get(13)?,
        created_at: row.get(14)?,
        likes: row.get(15)?,
        has_liked: row.get(16)?,
        comment_count: row.get(17)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        dream_id: row.get(1)?,
        author_id: row.get(2)?,
        author_name: row.get(3)?,
        author_avatar: row.get(4)?,
        text: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn user(db: &Database, username: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_profile(&id, username, username, "hash", None).unwrap();
        id
    }

    fn dream(db: &Database, author: &str, title: &str, visibility: &str, language: &str, minute: u32) -> String {
        let id = Uuid::new_v4().to_string();
        let at = format!("2024-05-01T10:{minute:02}:00.000000Z");
        db.insert_dream(&NewDream {
            id: id.clone(),
            author_id: author.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            visibility: visibility.to_string(),
            tags: vec!["Flying".to_string()],
            image_url: None,
            mood: None,
            is_lucid: false,
            language: language.to_string(),
            dreamt_at: at.clone(),
            created_at: at,
        })
        .unwrap();
        id
    }

    #[test]
    fn feed_excludes_private_and_other_languages() {
        let db = db();
        let alice = user(&db, "alice");
        let public_en = dream(&db, &alice, "sea", "public", "en", 1);
        dream(&db, &alice, "secret", "private", "en", 2);
        dream(&db, &alice, "mar", "public", "pt", 3);

        // The author does not see their own private dream in the feed either
        let rows = db.get_feed(Some(&alice), "en", FeedOrder::Recent, 10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, public_en);
        assert_eq!(rows[0].tags, vec!["Flying".to_string()]);
    }

    #[test]
    fn feed_orders_and_paginates() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let ids: Vec<String> = (0..5)
            .map(|i| dream(&db, &alice, &format!("d{i}"), "public", "en", i))
            .collect();

        let first = db.get_feed(None, "en", FeedOrder::Recent, 3, 0).unwrap();
        let second = db.get_feed(None, "en", FeedOrder::Recent, 3, 3).unwrap();
        assert_eq!(first.iter().map(|r| &r.id).collect::<Vec<_>>(), vec![&ids[4], &ids[3], &ids[2]]);
        assert_eq!(second.len(), 2);

        db.toggle_like(&ids[0], &bob).unwrap();
        db.toggle_like(&ids[0], &alice).unwrap();
        db.toggle_like(&ids[1], &bob).unwrap();
        let popular = db.get_feed(Some(&bob), "en", FeedOrder::Popular, 2, 0).unwrap();
        assert_eq!(popular[0].id, ids[0]);
        assert_eq!(popular[0].likes, 2);
        assert!(popular[0].has_liked);
        assert_eq!(popular[1].id, ids[1]);
    }

    #[test]
    fn toggle_like_keeps_count_equal_to_rows() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = dream(&db, &alice, "sea", "public", "en", 1);

        assert_eq!(db.toggle_like(&id, &bob).unwrap(), Some((true, 1)));
        assert_eq!(db.toggle_like(&id, &alice).unwrap(), Some((true, 2)));
        assert_eq!(db.toggle_like(&id, &bob).unwrap(), Some((false, 1)));
        assert_eq!(db.like_count(&id).unwrap(), 1);

        let row = db.get_dream(&id, Some(&bob)).unwrap().unwrap();
        assert_eq!(row.likes, 1);
        assert!(!row.has_liked);
    }

    #[test]
    fn private_dreams_are_hidden_from_strangers() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = dream(&db, &alice, "secret", "private", "en", 1);

        assert!(db.get_dream(&id, Some(&bob)).unwrap().is_none());
        assert!(db.get_dream(&id, None).unwrap().is_none());
        assert!(db.get_dream(&id, Some(&alice)).unwrap().is_some());
        assert_eq!(db.toggle_like(&id, &bob).unwrap(), None);
        assert_eq!(db.toggle_like(&id, &alice).unwrap(), Some((true, 1)));
    }

    #[test]
    fn delete_cascades_to_comments_and_likes() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = dream(&db, &alice, "sea", "public", "en", 1);
        db.toggle_like(&id, &bob).unwrap();
        db.insert_comment("c1", &id, &bob, "wow", "2024-05-01T11:00:00Z").unwrap();

        assert!(!db.delete_dream(&id, &bob).unwrap());
        assert!(db.delete_dream(&id, &alice).unwrap());
        assert_eq!(db.like_count(&id).unwrap(), 0);
        assert!(db.get_comment("c1").unwrap().is_none());
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let db = db();
        let alice = user(&db, "alice");
        dream(&db, &alice, "Flying Whales", "public", "en", 1);
        dream(&db, &alice, "Flying secret", "private", "en", 2);
        dream(&db, &alice, "Teeth", "public", "pt", 3);

        let rows = db.search_public(None, "flying", 20).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Flying Whales");

        assert_eq!(db.search_public(None, "", 20).unwrap().len(), 2);
        assert!(db.search_public(None, "100%", 20).unwrap().is_empty());
    }

    #[test]
    fn search_folds_accented_letters() {
        let db = db();
        let alice = user(&db, "alice");
        dream(&db, &alice, "Água Escura", "public", "pt", 1);

        assert_eq!(db.search_public(None, "água", 20).unwrap().len(), 1);
        assert_eq!(db.search_public(None, "ÁGUA", 20).unwrap().len(), 1);
        assert_eq!(db.search_public(None, "escura", 20).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_username_is_reported_not_raised() {
        let db = db();
        user(&db, "alice");
        let id = Uuid::new_v4().to_string();
        assert!(!db.create_profile(&id, "alice", "Other", "hash", None).unwrap());
        assert!(db.get_profile_by_id(&id).unwrap().is_none());
    }

    #[test]
    fn update_dream_requires_ownership_and_clears_nullable_fields() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = dream(&db, &alice, "sea", "public", "en", 1);

        let patch = DreamPatch {
            title: Some("ocean".into()),
            mood: Some(Some("Calm".into())),
            visibility: Some("private".into()),
            ..Default::default()
        };
        assert!(!db.update_dream(&id, &bob, &patch).unwrap());
        assert!(db.update_dream(&id, &alice, &patch).unwrap());

        let row = db.get_dream(&id, Some(&alice)).unwrap().unwrap();
        assert_eq!(row.title, "ocean");
        assert_eq!(row.mood.as_deref(), Some("Calm"));
        assert_eq!(row.visibility, "private");

        let clear = DreamPatch {
            mood: Some(None),
            ..Default::default()
        };
        assert!(db.update_dream(&id, &alice, &clear).unwrap());
        assert!(db.get_dream(&id, Some(&alice)).unwrap().unwrap().mood.is_none());
    }

    #[test]
    fn avatar_quota_resets_daily() {
        let db = db();
        let alice = user(&db, "alice");

        for i in 0..3 {
            let avatar = format!("a{i}");
            let outcome = db.update_profile(&alice, None, Some(&avatar), "2024-05-01", 3).unwrap();
            assert!(matches!(outcome, ProfileUpdate::Updated(_)));
        }
        let outcome = db.update_profile(&alice, None, Some("a3"), "2024-05-01", 3).unwrap();
        assert!(matches!(outcome, ProfileUpdate::QuotaExceeded));

        // Name-only edits do not spend quota
        let outcome = db.update_profile(&alice, Some("Alice"), None, "2024-05-01", 3).unwrap();
        assert!(matches!(outcome, ProfileUpdate::Updated(ref p) if p.name == "Alice"));

        match db.update_profile(&alice, None, Some("a3"), "2024-05-02", 3).unwrap() {
            ProfileUpdate::Updated(p) => {
                assert_eq!(p.avatar_changes_count, 1);
                assert_eq!(p.avatar_updated_at.as_deref(), Some("2024-05-02"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comments_newest_first_and_author_only_delete() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = dream(&db, &alice, "sea", "public", "en", 1);
        db.insert_comment("c1", &id, &bob, "first", "2024-05-01T11:00:00Z").unwrap();
        db.insert_comment("c2", &id, &alice, "second", "2024-05-01T12:00:00Z").unwrap();

        let rows = db.get_comments(&id).unwrap();
        assert_eq!(rows.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["c2", "c1"]);
        assert_eq!(rows[1].author_name, "bob");

        assert!(!db.delete_comment("c1", &alice).unwrap());
        assert!(db.delete_comment("c1", &bob).unwrap());
        assert_eq!(db.get_dream(&id, None).unwrap().unwrap().comment_count, 1);
    }
}
