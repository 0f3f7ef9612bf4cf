//! Trait seams between the library and its host application.
//!
//! The host only sees these interfaces; [`LocalLibrary`] implements all of
//! them. Tests and alternative sources can substitute their own.
//!
//! # Example
//!
//! ```ignore
//! use music_shelf::library::{FavoriteExcludeHandler, MusicSourceProvider};
//!
//! async fn on_track_finished<T: FavoriteExcludeHandler>(handler: &T, uuid: Uuid) {
//!     handler.record_play(&uuid).await?;
//! }
//! ```

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::LocalLibrary;
use crate::cover::CoverArt;
use crate::error::Result;
use crate::scanner::ScanOutcome;

/// A source of playlists, albums and tracks.
#[async_trait]
pub trait MusicSourceProvider: Send + Sync {
    /// Produce the current library, using caches where valid.
    async fn scan(&self) -> ScanOutcome;

    /// Produce the current library, rescanning everything.
    async fn refresh(&self) -> ScanOutcome;
}

/// Cover resolution for tracks, albums and playlists.
#[async_trait]
pub trait CoverProvider: Send + Sync {
    async fn music_cover(&self, path: &Path) -> Arc<CoverArt>;

    async fn album_cover(&self, dir: &Path) -> Arc<CoverArt>;

    async fn playlist_cover(&self, dir: &Path) -> Arc<CoverArt>;

    /// Raw bytes and MIME type of a track's cover, `None` when it has none.
    async fn cover_bytes(&self, path: &Path) -> Option<(Vec<u8>, String)>;

    async fn clear_cache(&self) -> Result<u64>;
}

/// Per-track user state.
#[async_trait]
pub trait FavoriteExcludeHandler: Send + Sync {
    async fn is_favorite(&self, uuid: &Uuid) -> Result<bool>;

    async fn set_favorite(&self, uuid: &Uuid, value: bool) -> Result<()>;

    async fn is_excluded(&self, uuid: &Uuid) -> Result<bool>;

    async fn set_excluded(&self, uuid: &Uuid, value: bool) -> Result<()>;

    async fn record_play(&self, uuid: &Uuid) -> Result<()>;
}

#[async_trait]
impl MusicSourceProvider for LocalLibrary {
    async fn scan(&self) -> ScanOutcome {
        LocalLibrary::scan(self).await
    }

    async fn refresh(&self) -> ScanOutcome {
        LocalLibrary::refresh(self).await
    }
}

#[async_trait]
impl CoverProvider for LocalLibrary {
    async fn music_cover(&self, path: &Path) -> Arc<CoverArt> {
        LocalLibrary::music_cover(self, path).await
    }

    async fn album_cover(&self, dir: &Path) -> Arc<CoverArt> {
        LocalLibrary::album_cover(self, dir).await
    }

    async fn playlist_cover(&self, dir: &Path) -> Arc<CoverArt> {
        LocalLibrary::playlist_cover(self, dir).await
    }

    async fn cover_bytes(&self, path: &Path) -> Option<(Vec<u8>, String)> {
        LocalLibrary::cover_bytes(self, path).await
    }

    async fn clear_cache(&self) -> Result<u64> {
        self.clear_cover_cache().await
    }
}

#[async_trait]
impl FavoriteExcludeHandler for LocalLibrary {
    async fn is_favorite(&self, uuid: &Uuid) -> Result<bool> {
        LocalLibrary::is_favorite(self, uuid).await
    }

    async fn set_favorite(&self, uuid: &Uuid, value: bool) -> Result<()> {
        LocalLibrary::set_favorite(self, uuid, value).await
    }

    async fn is_excluded(&self, uuid: &Uuid) -> Result<bool> {
        LocalLibrary::is_excluded(self, uuid).await
    }

    async fn set_excluded(&self, uuid: &Uuid, value: bool) -> Result<()> {
        LocalLibrary::set_excluded(self, uuid, value).await
    }

    async fn record_play(&self, uuid: &Uuid) -> Result<()> {
        LocalLibrary::record_play(self, uuid).await
    }
}
