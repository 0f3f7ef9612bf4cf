//! Per-track user state keyed by track uuid.
//!
//! Favorites and exclusions are presence rows; play stats hold a counter and
//! the last play time. None of these tables are touched by a scan, only by
//! orphan cleanup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::{now, parse_time};

/// Boolean per-track flags stored as presence rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Favorite,
    Excluded,
}

impl Mark {
    pub(crate) fn table(self) -> &'static str {
        match self {
            Mark::Favorite => "favorites",
            Mark::Excluded => "excluded",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::Favorite => write!(f, "favorite"),
            Mark::Excluded => write!(f, "excluded"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayStats {
    pub play_count: i64,
    pub last_played: Option<DateTime<Utc>>,
}

pub async fn is_marked(pool: &SqlitePool, mark: Mark, uuid: &Uuid) -> sqlx::Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE uuid = ?", mark.table());
    let (count,): (i64,) = sqlx::query_as(&sql)
        .bind(uuid.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Set or clear a mark. Setting an already-set mark keeps its original
/// `added_at`.
pub async fn set_marked(pool: &SqlitePool, mark: Mark, uuid: &Uuid, value: bool) -> sqlx::Result<()> {
    if value {
        let sql = format!(
            "INSERT OR IGNORE INTO {} (uuid, added_at) VALUES (?, ?)",
            mark.table()
        );
        sqlx::query(&sql)
            .bind(uuid.to_string())
            .bind(now())
            .execute(pool)
            .await?;
    } else {
        let sql = format!("DELETE FROM {} WHERE uuid = ?", mark.table());
        sqlx::query(&sql).bind(uuid.to_string()).execute(pool).await?;
    }
    Ok(())
}

/// Every uuid carrying `mark`, oldest first.
pub async fn marked(pool: &SqlitePool, mark: Mark) -> sqlx::Result<Vec<Uuid>> {
    let sql = format!("SELECT uuid FROM {} ORDER BY added_at, uuid", mark.table());
    let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .filter_map(|(uuid,)| Uuid::parse_str(&uuid).ok())
        .collect())
}

/// Count one play of a track.
pub async fn record_play(pool: &SqlitePool, uuid: &Uuid) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO play_stats (uuid, play_count, last_played) VALUES (?, 1, ?)
        ON CONFLICT(uuid) DO UPDATE SET
            play_count = play_count + 1,
            last_played = excluded.last_played
        "#,
    )
    .bind(uuid.to_string())
    .bind(now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Play stats for a track; never-played tracks report zero plays.
pub async fn play_stats(pool: &SqlitePool, uuid: &Uuid) -> sqlx::Result<PlayStats> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT play_count, last_played FROM play_stats WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(pool)
            .await?;

    Ok(match row {
        Some((play_count, last_played)) => PlayStats {
            play_count,
            last_played: last_played.as_deref().and_then(parse_time),
        },
        None => PlayStats::default(),
    })
}
