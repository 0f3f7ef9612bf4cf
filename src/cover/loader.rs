//! Two-tier cover loader.
//!
//! Lookups go memory cache, then persisted `cover_cache` row, then a fresh
//! search. A persisted row whose file is gone (or no longer yields an image)
//! is deleted and the search re-run. Only successful resolutions are
//! persisted; misses are remembered in memory for the process lifetime.

use parking_lot::RwLock;
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    CoverArt, CoverCandidate, CoverKind, CoverSearcher, CoverSource, CoverSourceKind,
    DefaultCoverProvider, load_embedded, mime_from_extension,
};
use crate::db::cover_cache;
use crate::error::Result;
use crate::metadata::TagExtractor;

pub struct CoverLoader {
    pool: SqlitePool,
    extractor: Arc<dyn TagExtractor>,
    defaults: Arc<dyn DefaultCoverProvider>,
    searcher: CoverSearcher,
    /// `None` records a search that found nothing
    memory: RwLock<HashMap<String, Option<Arc<CoverArt>>>>,
}

impl CoverLoader {
    pub fn new(
        pool: SqlitePool,
        extractor: Arc<dyn TagExtractor>,
        defaults: Arc<dyn DefaultCoverProvider>,
        searcher: CoverSearcher,
    ) -> Self {
        Self {
            pool,
            extractor,
            defaults,
            searcher,
            memory: RwLock::new(HashMap::new()),
        }
    }

    /// Cover for a track: its own embedded artwork, then its directory's
    /// images, then the default track cover.
    pub async fn music_cover(&self, path: &Path) -> Arc<CoverArt> {
        self.resolve(CoverKind::Music, path)
            .await
            .unwrap_or_else(|| self.defaults.music_cover())
    }

    /// Cover for an album directory: images, then the first audio file's
    /// embedded artwork, then the default album cover.
    pub async fn album_cover(&self, dir: &Path) -> Arc<CoverArt> {
        self.resolve(CoverKind::Album, dir)
            .await
            .unwrap_or_else(|| self.defaults.album_cover())
    }

    /// Cover for a playlist directory: images only, then the default album
    /// cover.
    pub async fn playlist_cover(&self, dir: &Path) -> Arc<CoverArt> {
        self.resolve(CoverKind::Playlist, dir)
            .await
            .unwrap_or_else(|| self.defaults.album_cover())
    }

    /// Raw bytes and MIME type of a track's cover, without default fallback.
    pub async fn cover_bytes(&self, path: &Path) -> Option<(Vec<u8>, String)> {
        self.resolve(CoverKind::Music, path)
            .await
            .map(|art| (art.data.clone(), art.mime_type.clone()))
    }

    /// Resolve a cover of any kind, `None` when nothing was found.
    pub async fn resolve(&self, kind: CoverKind, path: &Path) -> Option<Arc<CoverArt>> {
        if path.as_os_str().is_empty() {
            return None;
        }

        let key = kind.cache_key(path);
        let cached = self.memory.read().get(&key).cloned();
        if let Some(hit) = cached {
            return hit;
        }

        let art = match self.load_persisted(&key).await {
            Some(art) => Some(art),
            None => self.search(kind, path, &key).await,
        };

        self.memory.write().insert(key, art.clone());
        art
    }

    /// Drop both cache tiers. Returns the number of persisted rows removed.
    pub async fn clear_cache(&self) -> Result<u64> {
        self.memory.write().clear();
        Ok(cover_cache::clear(&self.pool).await?)
    }

    async fn load_persisted(&self, key: &str) -> Option<Arc<CoverArt>> {
        let row = match cover_cache::get(&self.pool, key).await {
            Ok(row) => row?,
            Err(e) => {
                warn!(key, error = %e, "Failed to read cover cache");
                return None;
            }
        };

        let candidate = row
            .cover_path
            .zip(CoverSourceKind::from_code(row.source_type))
            .map(|(path, kind)| CoverCandidate { path: path.into(), kind })
            .filter(|c| c.path.is_file());

        if let Some(candidate) = candidate
            && let Some(art) = self.load(&candidate).await
        {
            return Some(Arc::new(art));
        }

        debug!(key, "Persisted cover is no longer valid");
        if let Err(e) = cover_cache::remove(&self.pool, key).await {
            warn!(key, error = %e, "Failed to remove stale cover cache entry");
        }
        None
    }

    async fn search(&self, kind: CoverKind, path: &Path, key: &str) -> Option<Arc<CoverArt>> {
        let candidates: Vec<CoverCandidate> = match kind {
            CoverKind::Music => std::iter::once(CoverCandidate::embedded(path))
                .chain(path.parent().and_then(|dir| self.searcher.search_directory(dir)))
                .collect(),
            CoverKind::Album => self.searcher.search_directory_with_audio(path).into_iter().collect(),
            CoverKind::Playlist => self.searcher.search_directory(path).into_iter().collect(),
        };

        for candidate in candidates {
            let Some(art) = self.load(&candidate).await else {
                continue;
            };
            let cover_path = candidate.path.to_string_lossy();
            if let Err(e) =
                cover_cache::save(&self.pool, key, Some(cover_path.as_ref()), candidate.kind.code()).await
            {
                warn!(key, error = %e, "Failed to persist cover cache entry");
            }
            return Some(Arc::new(art));
        }

        debug!(key, "No cover found");
        None
    }

    async fn load(&self, candidate: &CoverCandidate) -> Option<CoverArt> {
        match candidate.kind {
            CoverSourceKind::ImageFile => match tokio::fs::read(&candidate.path).await {
                Ok(data) if !data.is_empty() => Some(CoverArt {
                    data,
                    mime_type: mime_from_extension(&candidate.path).to_string(),
                    source: CoverSource::ImageFile(candidate.path.clone()),
                }),
                Ok(_) => None,
                Err(e) => {
                    debug!(path = %candidate.path.display(), error = %e, "Failed to read cover image");
                    None
                }
            },
            CoverSourceKind::AudioEmbedded => load_embedded(&self.extractor, &candidate.path).await,
        }
    }
}
