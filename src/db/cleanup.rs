//! Orphan cleanup.
//!
//! A full set-difference sweep against the latest scan snapshot: user-state
//! rows whose uuid is not in the snapshot and cached playlists whose tag id
//! is not in it are deleted. No delete tracking is kept between scans.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use super::cache;

/// Rows removed by one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub favorites: u64,
    pub excluded: u64,
    pub play_stats: u64,
    pub stale_playlists: Vec<String>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.favorites == 0
            && self.excluded == 0
            && self.play_stats == 0
            && self.stale_playlists.is_empty()
    }
}

const USER_STATE_TABLES: [&str; 3] = ["favorites", "excluded", "play_stats"];

/// Delete every row that no longer corresponds to the snapshot.
///
/// User-state tables are swept in one transaction, stale playlists (with
/// their album and track rows) in a second one.
pub async fn cleanup_orphans(
    pool: &SqlitePool,
    valid_uuids: &HashSet<Uuid>,
    valid_tag_ids: &HashSet<String>,
) -> sqlx::Result<CleanupReport> {
    let mut report = CleanupReport::default();

    let mut tx = pool.begin().await?;
    for table in USER_STATE_TABLES {
        let sql = format!("SELECT uuid FROM {table}");
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&mut *tx).await?;

        let delete = format!("DELETE FROM {table} WHERE uuid = ?");
        let mut removed = 0;
        for (uuid,) in rows {
            let valid = Uuid::parse_str(&uuid)
                .map(|u| valid_uuids.contains(&u))
                .unwrap_or(false);
            if !valid {
                removed += sqlx::query(&delete)
                    .bind(&uuid)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                debug!(table, uuid = %uuid, "Removed orphaned user state");
            }
        }

        match table {
            "favorites" => report.favorites = removed,
            "excluded" => report.excluded = removed,
            _ => report.play_stats = removed,
        }
    }
    tx.commit().await?;

    let stale: Vec<String> = cache::cached_tag_ids(pool)
        .await?
        .into_iter()
        .filter(|tag| !valid_tag_ids.contains(tag))
        .collect();

    if !stale.is_empty() {
        let mut tx = pool.begin().await?;
        for tag_id in &stale {
            cache::delete_playlist_rows(&mut tx, tag_id).await?;
            debug!(tag_id = %tag_id, "Removed stale playlist cache");
        }
        tx.commit().await?;
    }
    report.stale_playlists = stale;

    if !report.is_empty() {
        info!(
            favorites = report.favorites,
            excluded = report.excluded,
            play_stats = report.play_stats,
            playlists = report.stale_playlists.len(),
            "Cleaned up orphaned rows"
        );
    }

    Ok(report)
}
