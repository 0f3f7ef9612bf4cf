//! Playlist, album and track cache rows.
//!
//! Rows are disposable projections of the last full scan of a playlist and
//! can always be rebuilt from the filesystem. A playlist's rows are rewritten
//! as a unit inside one transaction.

use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{format_time, now, parse_time};
use crate::identity;
use crate::model::{Album, Playlist, Track};

/// Database row for `playlist_cache`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaylistCacheRow {
    pub tag_id: String,
    pub display_name: Option<String>,
    pub directory_path: String,
    pub last_scanned: String,
}

/// Database row for `album_cache`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlbumCacheRow {
    pub album_id: String,
    pub tag_id: String,
    pub display_name: Option<String>,
    pub artist: Option<String>,
    pub directory_path: String,
    pub is_default: bool,
}

/// Database row for `song_cache`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SongCacheRow {
    pub uuid: String,
    pub tag_id: String,
    pub album_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub file_path: String,
    pub file_modified: Option<String>,
}

impl SongCacheRow {
    /// Convert back into a [`Track`]. Rows with an unparsable uuid are
    /// unusable and yield `None`.
    pub fn into_track(self) -> Option<Track> {
        let uuid = Uuid::parse_str(&self.uuid).ok()?;
        let source_path = PathBuf::from(&self.file_path);
        let title = self.title.unwrap_or_else(|| file_stem(&source_path));
        let album_id = self
            .album_id
            .unwrap_or_else(|| identity::default_album_id(&self.tag_id));
        Some(Track {
            uuid,
            title,
            artist: self.artist,
            album_id,
            tag_id: self.tag_id,
            source_path,
            file_modified: self.file_modified.as_deref().and_then(parse_time),
        })
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Replace every cached row of a playlist with the given snapshot.
///
/// Old rows for the tag id are cleared and the new ones written in a single
/// transaction; on error nothing is changed.
pub async fn save_playlist(
    pool: &SqlitePool,
    playlist: &Playlist,
    albums: &[Album],
    tracks: &[Track],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    delete_playlist_rows(&mut tx, &playlist.tag_id).await?;

    sqlx::query(
        "INSERT INTO playlist_cache (tag_id, display_name, directory_path, last_scanned) VALUES (?, ?, ?, ?)",
    )
    .bind(&playlist.tag_id)
    .bind(&playlist.display_name)
    .bind(playlist.directory_path.to_string_lossy().as_ref())
    .bind(now())
    .execute(&mut *tx)
    .await?;

    for album in albums {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO album_cache
                (album_id, tag_id, display_name, artist, directory_path, is_default)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&album.album_id)
        .bind(&playlist.tag_id)
        .bind(&album.display_name)
        .bind(&album.artist)
        .bind(album.directory_path.to_string_lossy().as_ref())
        .bind(album.is_default)
        .execute(&mut *tx)
        .await?;
    }

    for track in tracks {
        insert_track(&mut tx, track).await?;
    }

    tx.commit().await
}

/// Insert or update individual track rows (used when the cache path
/// refreshes tracks whose files changed).
pub async fn upsert_tracks(pool: &SqlitePool, tracks: &[Track]) -> sqlx::Result<()> {
    if tracks.is_empty() {
        return Ok(());
    }
    let mut tx = pool.begin().await?;
    for track in tracks {
        insert_track(&mut tx, track).await?;
    }
    tx.commit().await
}

pub async fn has_playlist(pool: &SqlitePool, tag_id: &str) -> sqlx::Result<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM playlist_cache WHERE tag_id = ?")
        .bind(tag_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn get_playlist(pool: &SqlitePool, tag_id: &str) -> sqlx::Result<Option<PlaylistCacheRow>> {
    sqlx::query_as::<_, PlaylistCacheRow>(
        "SELECT tag_id, display_name, directory_path, last_scanned FROM playlist_cache WHERE tag_id = ?",
    )
    .bind(tag_id)
    .fetch_optional(pool)
    .await
}

/// All cached playlist tag ids.
pub async fn cached_tag_ids(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT tag_id FROM playlist_cache ORDER BY tag_id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(tag,)| tag).collect())
}

pub async fn albums_for_playlist(pool: &SqlitePool, tag_id: &str) -> sqlx::Result<Vec<AlbumCacheRow>> {
    sqlx::query_as::<_, AlbumCacheRow>(
        r#"
        SELECT album_id, tag_id, display_name, artist, directory_path, is_default
        FROM album_cache
        WHERE tag_id = ?
        ORDER BY is_default, album_id
        "#,
    )
    .bind(tag_id)
    .fetch_all(pool)
    .await
}

pub async fn tracks_for_playlist(pool: &SqlitePool, tag_id: &str) -> sqlx::Result<Vec<SongCacheRow>> {
    sqlx::query_as::<_, SongCacheRow>(
        r#"
        SELECT uuid, tag_id, album_id, title, artist, file_path, file_modified
        FROM song_cache
        WHERE tag_id = ?
        ORDER BY file_path
        "#,
    )
    .bind(tag_id)
    .fetch_all(pool)
    .await
}

/// Delete a tag id's rows, children first.
pub(crate) async fn delete_playlist_rows(conn: &mut SqliteConnection, tag_id: &str) -> sqlx::Result<()> {
    for sql in [
        "DELETE FROM song_cache WHERE tag_id = ?",
        "DELETE FROM album_cache WHERE tag_id = ?",
        "DELETE FROM playlist_cache WHERE tag_id = ?",
    ] {
        sqlx::query(sql).bind(tag_id).execute(&mut *conn).await?;
    }
    Ok(())
}

async fn insert_track(conn: &mut SqliteConnection, track: &Track) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO song_cache
            (uuid, tag_id, album_id, title, artist, file_path, file_modified)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(track.uuid.to_string())
    .bind(&track.tag_id)
    .bind(&track.album_id)
    .bind(&track.title)
    .bind(&track.artist)
    .bind(track.source_path.to_string_lossy().as_ref())
    .bind(track.file_modified.map(format_time))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{temp_db, track_fixture};

    fn playlist(name: &str) -> Playlist {
        Playlist {
            tag_id: identity::tag_id(name),
            display_name: name.to_string(),
            directory_path: PathBuf::from(format!("/music/{name}")),
        }
    }

    fn album(playlist: &Playlist, name: &str) -> Album {
        Album {
            album_id: identity::album_id(&playlist.tag_id, name),
            display_name: name.to_string(),
            artist: Some("Artist".to_string()),
            tag_id: playlist.tag_id.clone(),
            directory_path: playlist.directory_path.join(name),
            is_default: false,
        }
    }

    #[tokio::test]
    async fn test_save_and_load_playlist() {
        let (pool, _dir) = temp_db().await;
        let p = playlist("Chill");
        let a = album(&p, "Night");
        let t = track_fixture(&p.tag_id, &a.album_id, "/music/Chill/Night/one.mp3");

        save_playlist(&pool, &p, &[a.clone()], &[t.clone()]).await.unwrap();

        assert!(has_playlist(&pool, &p.tag_id).await.unwrap());
        let row = get_playlist(&pool, &p.tag_id).await.unwrap().unwrap();
        assert_eq!(row.display_name.as_deref(), Some("Chill"));

        let albums = albums_for_playlist(&pool, &p.tag_id).await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].artist.as_deref(), Some("Artist"));
        assert!(!albums[0].is_default);

        let tracks: Vec<Track> = tracks_for_playlist(&pool, &p.tag_id)
            .await
            .unwrap()
            .into_iter()
            .filter_map(SongCacheRow::into_track)
            .collect();
        assert_eq!(tracks, vec![t]);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_rows() {
        let (pool, _dir) = temp_db().await;
        let p = playlist("Chill");
        let a = album(&p, "Night");
        let old = track_fixture(&p.tag_id, &a.album_id, "/music/Chill/Night/old.mp3");
        let new = track_fixture(&p.tag_id, &a.album_id, "/music/Chill/Night/new.mp3");

        save_playlist(&pool, &p, &[a.clone()], &[old]).await.unwrap();
        save_playlist(&pool, &p, &[a], &[new.clone()]).await.unwrap();

        let rows = tracks_for_playlist(&pool, &p.tag_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].uuid, new.uuid.to_string());
    }

    #[tokio::test]
    async fn test_delete_playlist_rows_leaves_other_tags() {
        let (pool, _dir) = temp_db().await;
        let chill = playlist("Chill");
        let rock = playlist("Rock");
        let rock_album = album(&rock, "Live");
        let rock_track = track_fixture(&rock.tag_id, &rock_album.album_id, "/music/Rock/Live/a.mp3");

        save_playlist(&pool, &chill, &[album(&chill, "Night")], &[]).await.unwrap();
        save_playlist(&pool, &rock, &[rock_album], &[rock_track]).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        delete_playlist_rows(&mut tx, &chill.tag_id).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(cached_tag_ids(&pool).await.unwrap(), vec![rock.tag_id.clone()]);
        assert!(albums_for_playlist(&pool, &chill.tag_id).await.unwrap().is_empty());
        assert_eq!(tracks_for_playlist(&pool, &rock.tag_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_tracks_updates_title() {
        let (pool, _dir) = temp_db().await;
        let p = playlist("Chill");
        let a = album(&p, "Night");
        let mut t = track_fixture(&p.tag_id, &a.album_id, "/music/Chill/Night/one.mp3");
        save_playlist(&pool, &p, &[a], &[t.clone()]).await.unwrap();

        t.title = "Retitled".to_string();
        upsert_tracks(&pool, &[t.clone()]).await.unwrap();

        let rows = tracks_for_playlist(&pool, &p.tag_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("Retitled"));
    }

    #[test]
    fn test_row_with_missing_fields_falls_back() {
        let row = SongCacheRow {
            uuid: Uuid::from_u128(7).to_string(),
            tag_id: "local_Chill".to_string(),
            album_id: None,
            title: None,
            artist: None,
            file_path: "/music/Chill/loose.mp3".to_string(),
            file_modified: None,
        };
        let track = row.into_track().unwrap();
        assert_eq!(track.title, "loose");
        assert_eq!(track.album_id, "local_Chill#default");
    }

    #[test]
    fn test_row_with_bad_uuid_is_dropped() {
        let row = SongCacheRow {
            uuid: "garbage".to_string(),
            tag_id: "local_Chill".to_string(),
            album_id: None,
            title: None,
            artist: None,
            file_path: "/music/Chill/loose.mp3".to_string(),
            file_modified: None,
        };
        assert!(row.into_track().is_none());
    }
}
