//! Folder scanner.
//!
//! Turns the directory tree under the library root into a [`ScanResult`]:
//!
//! ```text
//! <root>/<playlist>/<album>/<file>            album track
//! <root>/<playlist>/<album>/<subdir>/<file>   album track (one level deep)
//! <root>/<playlist>/<file>                    default album track
//! <root>/<file>                               moved to <root>/default first
//! ```
//!
//! Each playlist is either loaded from the cache (rescan flag present) or
//! fully scanned, in which case its cache rows are rewritten and the flag is
//! written. Filesystem and tag errors are absorbed; cache persistence errors
//! are collected in [`ScanOutcome::cache_failures`].

mod cache;
pub mod files;
pub mod normalize;
pub mod rescan;
pub mod sidecar;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::Error;
use crate::identity;
use crate::metadata::{TagExtractor, TrackTags};
use crate::model::{Album, Playlist, ScanResult, Track};

/// How many directory levels below an album directory still count as part
/// of that album.
pub const ALBUM_SUBDIR_DEPTH: usize = 1;

/// A cache write that failed during a scan. The scan result is still valid.
#[derive(Debug)]
pub struct CacheFailure {
    /// Playlist tag id, or `"cleanup"` for the orphan sweep
    pub scope: String,
    pub error: Error,
}

/// Result of one scan pass.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub cache_failures: Vec<CacheFailure>,
}

/// Everything a scan produced for one playlist.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaylistSnapshot {
    pub playlist: Option<Playlist>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

/// Scans one library root.
pub struct FolderScanner {
    root: PathBuf,
    force_rescan: bool,
    pool: SqlitePool,
    extractor: Arc<dyn TagExtractor>,
}

impl FolderScanner {
    pub fn new(
        root: impl Into<PathBuf>,
        pool: SqlitePool,
        extractor: Arc<dyn TagExtractor>,
    ) -> Self {
        Self {
            root: root.into(),
            force_rescan: false,
            pool,
            extractor,
        }
    }

    /// Always do a full scan, ignoring rescan flags.
    pub fn with_force_rescan(mut self, force: bool) -> Self {
        self.force_rescan = force;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the whole root. `force` rescans every playlist for this pass
    /// only, on top of the configured setting.
    pub async fn scan(&self, force: bool) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "Library root does not exist");
            return outcome;
        }

        normalize::move_root_loose_files(&self.root);

        let mut from_cache = 0usize;
        let mut rescanned = 0usize;

        for dir in files::subdirectories(&self.root) {
            let Some(dir_name) = entry_name(&dir) else {
                continue;
            };
            let tag_id = identity::tag_id(&dir_name);
            let needs_rescan = force || self.force_rescan || rescan::needs_rescan(&dir);

            if !needs_rescan {
                match self.load_cached_playlist(&dir, &dir_name).await {
                    Ok(Some(cached)) => {
                        if let Err(e) = db::cache::upsert_tracks(&self.pool, &cached.refreshed).await {
                            warn!(tag_id = %tag_id, error = %e, "Failed to update refreshed tracks");
                            outcome.cache_failures.push(CacheFailure {
                                scope: tag_id.clone(),
                                error: e.into(),
                            });
                        }
                        debug!(tag_id = %tag_id, tracks = cached.snapshot.tracks.len(), "Loaded playlist from cache");
                        push_snapshot(&mut outcome.result, cached.snapshot);
                        from_cache += 1;
                        continue;
                    }
                    Ok(None) => {
                        debug!(tag_id = %tag_id, "Cache has no valid tracks, rescanning");
                    }
                    Err(e) => {
                        warn!(tag_id = %tag_id, error = %e, "Failed to read playlist cache, rescanning");
                    }
                }
            }

            let snapshot = self.scan_playlist(&dir, &dir_name).await;
            self.persist(&dir, &tag_id, &snapshot, &mut outcome.cache_failures)
                .await;
            push_snapshot(&mut outcome.result, snapshot);
            rescanned += 1;
        }

        info!(
            playlists = outcome.result.playlists.len(),
            albums = outcome.result.albums.len(),
            tracks = outcome.result.tracks.len(),
            from_cache,
            rescanned,
            "Scan complete"
        );
        outcome
    }

    /// Rewrite the cache rows for a fully scanned playlist, then mark it as
    /// scanned. On failure the flag is removed so the next pass rescans.
    async fn persist(
        &self,
        dir: &Path,
        tag_id: &str,
        snapshot: &PlaylistSnapshot,
        failures: &mut Vec<CacheFailure>,
    ) {
        let Some(playlist) = &snapshot.playlist else {
            return;
        };
        match db::cache::save_playlist(&self.pool, playlist, &snapshot.albums, &snapshot.tracks).await {
            Ok(()) => rescan::create_flag(dir),
            Err(e) => {
                warn!(tag_id, error = %e, "Failed to persist playlist cache");
                rescan::delete_flag(dir);
                failures.push(CacheFailure {
                    scope: tag_id.to_string(),
                    error: e.into(),
                });
            }
        }
    }

    /// Full scan of one playlist directory.
    async fn scan_playlist(&self, dir: &Path, dir_name: &str) -> PlaylistSnapshot {
        let tag_id = identity::tag_id(dir_name);
        let display_name = sidecar::read_playlist(dir)
            .display_name
            .unwrap_or_else(|| dir_name.to_string());
        sidecar::ensure_playlist(dir, &display_name);

        let mut snapshot = PlaylistSnapshot {
            playlist: Some(Playlist {
                tag_id: tag_id.clone(),
                display_name: display_name.clone(),
                directory_path: dir.to_path_buf(),
            }),
            ..Default::default()
        };

        for album_dir in files::subdirectories(dir) {
            let Some(album_name) = entry_name(&album_dir) else {
                continue;
            };
            let album_id = identity::album_id(&tag_id, &album_name);
            let meta = sidecar::read_album(&album_dir);

            let mut tracks = Vec::new();
            for file in files::audio_files_recursive(&album_dir, ALBUM_SUBDIR_DEPTH) {
                tracks.push(self.build_track(&file, &tag_id, &album_id).await);
            }

            let artist = meta.artist.or_else(|| first_artist(&tracks));
            let album_display = meta.display_name.unwrap_or(album_name);
            sidecar::ensure_album(&album_dir, &album_display, artist.as_deref());

            snapshot.albums.push(Album {
                album_id,
                display_name: album_display,
                artist,
                tag_id: tag_id.clone(),
                directory_path: album_dir,
                is_default: false,
            });
            snapshot.tracks.extend(tracks);
        }

        let loose = files::audio_files(dir);
        if !loose.is_empty() {
            let album_id = identity::default_album_id(&tag_id);
            let mut tracks = Vec::with_capacity(loose.len());
            for file in &loose {
                tracks.push(self.build_track(file, &tag_id, &album_id).await);
            }
            snapshot.albums.push(Album {
                album_id,
                display_name,
                artist: first_artist(&tracks),
                tag_id: tag_id.clone(),
                directory_path: dir.to_path_buf(),
                is_default: true,
            });
            snapshot.tracks.extend(tracks);
        }

        debug!(
            tag_id = %tag_id,
            albums = snapshot.albums.len(),
            tracks = snapshot.tracks.len(),
            "Scanned playlist"
        );
        snapshot
    }

    /// Build a track for an audio file. Unreadable tags fall back to the
    /// file stem as title and no artist.
    pub(crate) async fn build_track(&self, file: &Path, tag_id: &str, album_id: &str) -> Track {
        let tags = self.read_tags(file).await;
        Track {
            uuid: identity::track_uuid(&self.root, file),
            title: tags
                .title
                .unwrap_or_else(|| db::cache::file_stem(file)),
            artist: tags.artist,
            album_id: album_id.to_string(),
            tag_id: tag_id.to_string(),
            source_path: file.to_path_buf(),
            file_modified: modified_time(file),
        }
    }

    async fn read_tags(&self, file: &Path) -> TrackTags {
        let extractor = Arc::clone(&self.extractor);
        let path = file.to_path_buf();
        match tokio::task::spawn_blocking(move || extractor.read_tags(&path)).await {
            Ok(Ok(tags)) => tags,
            Ok(Err(e)) => {
                warn!(path = %file.display(), error = %e, "Failed to read tags, using file name");
                TrackTags::default()
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Tag extraction task failed");
                TrackTags::default()
            }
        }
    }
}

fn push_snapshot(result: &mut ScanResult, snapshot: PlaylistSnapshot) {
    if let Some(playlist) = snapshot.playlist {
        result.playlists.push(playlist);
    }
    result.albums.extend(snapshot.albums);
    result.tracks.extend(snapshot.tracks);
}

fn first_artist(tracks: &[Track]) -> Option<String> {
    tracks.first().and_then(|t| t.artist.clone())
}

pub(crate) fn entry_name(dir: &Path) -> Option<String> {
    dir.file_name().map(|n| n.to_string_lossy().to_string())
}

pub(crate) fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
