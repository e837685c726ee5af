//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data.

mod audiences;
mod notes;
mod projects;
mod releases;
mod repository;
mod translations;

pub use repository::*;

#[cfg(test)]
pub(crate) use repository::test_support;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
///
/// Rows are never physically deleted by the service; the cascades only matter for
/// external retention jobs. Uniqueness covers soft-deleted rows too, so a deleted
/// project or release keeps its slug until the row is purged.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            site_id INTEGER NOT NULL,
            slug TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0,
            UNIQUE (site_id, slug)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS releases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            slug TEXT NOT NULL,
            major INTEGER NOT NULL CHECK (major >= 0),
            minor INTEGER NOT NULL CHECK (minor >= 0),
            patch TEXT,
            state TEXT NOT NULL DEFAULT 'FUTURE'
                CHECK (state IN ('FUTURE', 'CURRENT', 'PREVIOUS')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0,
            UNIQUE (project_id, slug)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audiences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            slug TEXT NOT NULL,
            permission TEXT,
            UNIQUE (project_id, slug)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            note_type TEXT NOT NULL
                CHECK (note_type IN ('NEW_FEATURE', 'BUG_FIX', 'KNOWN_ISSUES')),
            release_id INTEGER NOT NULL REFERENCES releases(id) ON DELETE CASCADE,
            audience_id INTEGER REFERENCES audiences(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            note_id INTEGER NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            language TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // A note without audience counts as one audience value, hence IFNULL.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_release_type_audience
            ON notes(release_id, note_type, IFNULL(audience_id, 0));
        CREATE INDEX IF NOT EXISTS idx_projects_site ON projects(site_id, deleted);
        CREATE INDEX IF NOT EXISTS idx_releases_project ON releases(project_id, deleted);
        CREATE INDEX IF NOT EXISTS idx_audiences_project ON audiences(project_id);
        CREATE INDEX IF NOT EXISTS idx_translations_note ON translations(note_id, language);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
