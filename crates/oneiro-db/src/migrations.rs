use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            id                    TEXT PRIMARY KEY,
            username              TEXT NOT NULL UNIQUE,
            name                  TEXT NOT NULL,
            password              TEXT NOT NULL,
            avatar                TEXT,
            is_pro                INTEGER NOT NULL DEFAULT 0,
            streak                INTEGER NOT NULL DEFAULT 0,
            avatar_changes_count  INTEGER NOT NULL DEFAULT 0,
            avatar_updated_at     TEXT,
            created_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS dreams (
            id           TEXT PRIMARY KEY,
            author_id    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title        TEXT NOT NULL,
            description  TEXT NOT NULL,
            visibility   TEXT NOT NULL CHECK (visibility IN ('public', 'private')),
            tags         TEXT NOT NULL DEFAULT '[]',
            image_url    TEXT,
            mood         TEXT,
            is_lucid     INTEGER NOT NULL DEFAULT 0,
            language     TEXT NOT NULL DEFAULT 'en',
            analysis     TEXT,
            dreamt_at    TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_dreams_feed
            ON dreams(visibility, language, created_at);

        CREATE INDEX IF NOT EXISTS idx_dreams_author
            ON dreams(author_id, dreamt_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            dream_id    TEXT NOT NULL REFERENCES dreams(id) ON DELETE CASCADE,
            author_id   TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_dream
            ON comments(dream_id, created_at);

        -- One like per (user, dream); like counts are always COUNT(*) over this table
        CREATE TABLE IF NOT EXISTS interactions (
            user_id     TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            dream_id    TEXT NOT NULL REFERENCES dreams(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, dream_id)
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_dream
            ON interactions(dream_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
