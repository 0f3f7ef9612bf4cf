//! The local folder library.
//!
//! [`LocalLibrary`] wires the scanner, the cache store and the cover loader
//! together and is what the rest of an application talks to. A scan pass
//! and its orphan cleanup run under a single write gate; user-state writes
//! take the same gate so they cannot land between a snapshot and the
//! cleanup that is based on it.

mod traits;

pub use traits::{CoverProvider, FavoriteExcludeHandler, MusicSourceProvider};

use parking_lot::RwLock;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::cover::{BuiltinDefaultCovers, CoverArt, CoverLoader, CoverSearcher, DefaultCoverProvider};
use crate::db::{self, CleanupReport, Mark, PlayStats};
use crate::error::{Result, ResultExt};
use crate::metadata::{LoftyTagExtractor, TagExtractor};
use crate::model::ScanResult;
use crate::scanner::{CacheFailure, FolderScanner, ScanOutcome};

/// Tuning knobs for [`LocalLibrary::new`].
#[derive(Debug, Clone, Default)]
pub struct LibraryOptions {
    /// Fully scan every playlist, ignoring rescan flags
    pub force_rescan: bool,
    pub cover_searcher: CoverSearcher,
}

pub struct LocalLibrary {
    pool: SqlitePool,
    scanner: FolderScanner,
    covers: CoverLoader,
    write_gate: Mutex<()>,
    last_scan: RwLock<Arc<ScanResult>>,
}

impl LocalLibrary {
    pub fn new(
        root: impl Into<PathBuf>,
        pool: SqlitePool,
        extractor: Arc<dyn TagExtractor>,
        defaults: Arc<dyn DefaultCoverProvider>,
        options: LibraryOptions,
    ) -> Self {
        let scanner = FolderScanner::new(root, pool.clone(), Arc::clone(&extractor))
            .with_force_rescan(options.force_rescan);
        let covers = CoverLoader::new(pool.clone(), extractor, defaults, options.cover_searcher);
        Self {
            pool,
            scanner,
            covers,
            write_gate: Mutex::new(()),
            last_scan: RwLock::new(Arc::new(ScanResult::default())),
        }
    }

    /// Open the library described by `config` with the lofty extractor and
    /// the built-in default covers. Creates the root folder and the database
    /// directory when missing.
    pub async fn open(config: &Config) -> Result<Self> {
        let root = &config.library.root_folder;
        if !root.is_dir() {
            std::fs::create_dir_all(root)
                .with_context(format!("creating library root {}", root.display()))?;
            info!(root = %root.display(), "Created library root");
        }

        let db_path = &config.cache.database_path;
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(format!("creating database directory {}", parent.display()))?;
        }
        let pool = db::init_db(&db::db_url(Some(db_path))).await?;

        Ok(Self::new(
            root.clone(),
            pool,
            Arc::new(LoftyTagExtractor),
            Arc::new(BuiltinDefaultCovers::default()),
            LibraryOptions {
                force_rescan: config.library.force_rescan,
                cover_searcher: CoverSearcher::new(config.covers.preferred_names.iter().cloned()),
            },
        ))
    }

    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Snapshot of the last completed scan (empty before the first one).
    pub fn last_scan(&self) -> Arc<ScanResult> {
        Arc::clone(&self.last_scan.read())
    }

    /// Scan the library, honoring rescan flags, then clean up orphans.
    pub async fn scan(&self) -> ScanOutcome {
        self.scan_with(false).await
    }

    /// Full rescan of every playlist, then clean up orphans.
    pub async fn refresh(&self) -> ScanOutcome {
        self.scan_with(true).await
    }

    async fn scan_with(&self, force: bool) -> ScanOutcome {
        let _gate = self.write_gate.lock().await;
        let mut outcome = self.scanner.scan(force).await;

        // An unreadable root yields an empty snapshot that says nothing
        // about which tracks still exist.
        if self.scanner.root().is_dir() {
            let result = &outcome.result;
            if let Err(e) =
                db::cleanup_orphans(&self.pool, &result.valid_uuids(), &result.valid_tag_ids()).await
            {
                warn!(error = %e, "Orphan cleanup failed");
                outcome.cache_failures.push(CacheFailure {
                    scope: "cleanup".to_string(),
                    error: e.into(),
                });
            }
        }

        *self.last_scan.write() = Arc::new(outcome.result.clone());
        outcome
    }

    /// Remove rows not covered by the given valid sets.
    pub async fn cleanup_orphans(
        &self,
        valid_uuids: &HashSet<Uuid>,
        valid_tag_ids: &HashSet<String>,
    ) -> Result<CleanupReport> {
        let _gate = self.write_gate.lock().await;
        Ok(db::cleanup_orphans(&self.pool, valid_uuids, valid_tag_ids).await?)
    }

    // ------------------------------------------------------------------------
    // User state
    // ------------------------------------------------------------------------

    pub async fn is_favorite(&self, uuid: &Uuid) -> Result<bool> {
        Ok(db::user_state::is_marked(&self.pool, Mark::Favorite, uuid).await?)
    }

    pub async fn set_favorite(&self, uuid: &Uuid, value: bool) -> Result<()> {
        self.set_mark(Mark::Favorite, uuid, value).await
    }

    pub async fn is_excluded(&self, uuid: &Uuid) -> Result<bool> {
        Ok(db::user_state::is_marked(&self.pool, Mark::Excluded, uuid).await?)
    }

    pub async fn set_excluded(&self, uuid: &Uuid, value: bool) -> Result<()> {
        self.set_mark(Mark::Excluded, uuid, value).await
    }

    pub async fn favorites(&self) -> Result<Vec<Uuid>> {
        Ok(db::user_state::marked(&self.pool, Mark::Favorite).await?)
    }

    pub async fn excluded(&self) -> Result<Vec<Uuid>> {
        Ok(db::user_state::marked(&self.pool, Mark::Excluded).await?)
    }

    pub async fn record_play(&self, uuid: &Uuid) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        db::user_state::record_play(&self.pool, uuid)
            .await
            .with_context(format!("recording play of {uuid}"))
    }

    pub async fn play_stats(&self, uuid: &Uuid) -> Result<PlayStats> {
        Ok(db::user_state::play_stats(&self.pool, uuid).await?)
    }

    async fn set_mark(&self, mark: Mark, uuid: &Uuid, value: bool) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        db::user_state::set_marked(&self.pool, mark, uuid, value)
            .await
            .with_context(format!("updating {mark} state of {uuid}"))
    }

    // ------------------------------------------------------------------------
    // Covers
    // ------------------------------------------------------------------------

    pub async fn music_cover(&self, path: &Path) -> Arc<CoverArt> {
        self.covers.music_cover(path).await
    }

    pub async fn album_cover(&self, dir: &Path) -> Arc<CoverArt> {
        self.covers.album_cover(dir).await
    }

    pub async fn playlist_cover(&self, dir: &Path) -> Arc<CoverArt> {
        self.covers.playlist_cover(dir).await
    }

    pub async fn cover_bytes(&self, path: &Path) -> Option<(Vec<u8>, String)> {
        self.covers.cover_bytes(path).await
    }

    /// Cover of a track from the last scan, `None` for an unknown uuid.
    pub async fn track_cover(&self, uuid: &Uuid) -> Option<Arc<CoverArt>> {
        let path = self.last_scan().track(uuid)?.source_path.clone();
        Some(self.covers.music_cover(&path).await)
    }

    /// Cover of an album from the last scan, `None` for an unknown id.
    pub async fn album_cover_by_id(&self, album_id: &str) -> Option<Arc<CoverArt>> {
        let dir = self.last_scan().album(album_id)?.directory_path.clone();
        Some(self.covers.album_cover(&dir).await)
    }

    /// Cover of a playlist from the last scan, `None` for an unknown tag id.
    pub async fn playlist_cover_by_id(&self, tag_id: &str) -> Option<Arc<CoverArt>> {
        let dir = self.last_scan().playlist(tag_id)?.directory_path.clone();
        Some(self.covers.playlist_cover(&dir).await)
    }

    pub async fn clear_cover_cache(&self) -> Result<u64> {
        self.covers.clear_cache().await
    }
}
