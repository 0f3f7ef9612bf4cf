//! Persistent cache store.
//!
//! Uses SQLx with SQLite through a single shared connection. The store holds:
//! - last-known playlist/album/track rows ([`cache`]), partitioned by tag id
//! - per-track user state: favorites, exclusions, play stats ([`user_state`])
//! - resolved cover locations ([`cover_cache`])
//!
//! [`cleanup`] removes rows that no longer correspond to the latest scan.
//! Schema changes are versioned migrations under `migrations/`.
//!
//! # Example
//!
//! ```ignore
//! use music_shelf::db::{db_url, init_db};
//!
//! let pool = init_db(&db_url(Some(Path::new("library.db")))).await?;
//! let favorites = db::user_state::marked(&pool, Mark::Favorite).await?;
//! ```

pub mod cache;
pub mod cleanup;
pub mod cover_cache;
pub mod user_state;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

pub use cleanup::{CleanupReport, cleanup_orphans};
pub use user_state::{Mark, PlayStats};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_shelf.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Open (creating if needed) the database and run pending migrations.
///
/// The pool is capped at one connection: every statement, including the
/// multi-statement cache rewrites, goes through the same connection.
///
/// # Errors
///
/// Returns an error if the database cannot be created or opened, or if a
/// migration fails.
pub async fn init_db(db_url: &str) -> crate::error::Result<SqlitePool> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
        info!(url = db_url, "Created cache database");
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Current time in the format stored in timestamp columns.
pub(crate) fn now() -> String {
    format_time(Utc::now())
}

pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
