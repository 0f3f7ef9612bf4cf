//! Cache path of the scanner: rebuild a playlist from its cache rows.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{FolderScanner, PlaylistSnapshot, entry_name, modified_time, sidecar};
use crate::db;
use crate::error::Result;
use crate::identity;
use crate::model::{Album, Playlist, Track};

/// A playlist loaded from the cache.
pub(crate) struct CachedPlaylist {
    pub snapshot: PlaylistSnapshot,
    /// Tracks whose file changed since they were cached and were re-read
    pub refreshed: Vec<Track>,
}

impl FolderScanner {
    /// Load a playlist from the cache.
    ///
    /// Albums whose directory is gone and tracks whose file is gone are
    /// skipped, as is a default album left without tracks. Sidecar files are
    /// re-read. Returns `None` when nothing is
    /// cached for the playlist or no cached track survives.
    pub(crate) async fn load_cached_playlist(
        &self,
        dir: &Path,
        dir_name: &str,
    ) -> Result<Option<CachedPlaylist>> {
        let tag_id = identity::tag_id(dir_name);
        if db::cache::get_playlist(&self.pool, &tag_id).await?.is_none() {
            return Ok(None);
        }

        let display_name = sidecar::read_playlist(dir)
            .display_name
            .unwrap_or_else(|| dir_name.to_string());

        let mut albums = Vec::new();
        for row in db::cache::albums_for_playlist(&self.pool, &tag_id).await? {
            let album_dir = PathBuf::from(&row.directory_path);
            if !album_dir.is_dir() {
                debug!(album_id = %row.album_id, "Cached album directory is gone");
                continue;
            }

            let album = if row.is_default {
                Album {
                    display_name: display_name.clone(),
                    artist: row.artist,
                    ..album_from_row(row.album_id, album_dir, &tag_id, true)
                }
            } else {
                let meta = sidecar::read_album(&album_dir);
                let fallback = entry_name(&album_dir).unwrap_or_default();
                Album {
                    display_name: meta
                        .display_name
                        .or(row.display_name)
                        .unwrap_or(fallback),
                    artist: meta.artist.or(row.artist),
                    ..album_from_row(row.album_id, album_dir, &tag_id, false)
                }
            };
            albums.push(album);
        }

        let retained: HashSet<&str> = albums.iter().map(|a| a.album_id.as_str()).collect();
        let mut tracks = Vec::new();
        let mut refreshed = Vec::new();

        for row in db::cache::tracks_for_playlist(&self.pool, &tag_id).await? {
            let Some(track) = row.into_track() else {
                continue;
            };
            if !retained.contains(track.album_id.as_str()) || !track.source_path.is_file() {
                continue;
            }

            if modified_time(&track.source_path) != track.file_modified {
                debug!(path = %track.source_path.display(), "File changed since cached, re-reading tags");
                let fresh = self
                    .build_track(&track.source_path, &tag_id, &track.album_id)
                    .await;
                refreshed.push(fresh.clone());
                tracks.push(fresh);
            } else {
                tracks.push(track);
            }
        }

        if tracks.is_empty() {
            return Ok(None);
        }

        // The default album exists only while the playlist has loose files.
        let populated: HashSet<&str> = tracks.iter().map(|t| t.album_id.as_str()).collect();
        albums.retain(|a| !a.is_default || populated.contains(a.album_id.as_str()));

        Ok(Some(CachedPlaylist {
            snapshot: PlaylistSnapshot {
                playlist: Some(Playlist {
                    tag_id,
                    display_name,
                    directory_path: dir.to_path_buf(),
                }),
                albums,
                tracks,
            },
            refreshed,
        }))
    }
}

fn album_from_row(album_id: String, directory_path: PathBuf, tag_id: &str, is_default: bool) -> Album {
    Album {
        album_id,
        display_name: String::new(),
        artist: None,
        tag_id: tag_id.to_string(),
        directory_path,
        is_default,
    }
}
