//! Fallback covers used when resolution finds nothing.

use std::sync::Arc;

use super::{CoverArt, CoverSource};

/// Supplies the images shown when no cover could be resolved.
pub trait DefaultCoverProvider: Send + Sync {
    /// Default cover for a track
    fn music_cover(&self) -> Arc<CoverArt>;

    /// Default cover for an album or playlist
    fn album_cover(&self) -> Arc<CoverArt>;
}

/// Default covers compiled into the binary.
#[derive(Debug, Clone)]
pub struct BuiltinDefaultCovers {
    music: Arc<CoverArt>,
    album: Arc<CoverArt>,
}

const MUSIC_COVER_PNG: &[u8] = include_bytes!("../../assets/default-music-cover.png");
const ALBUM_COVER_PNG: &[u8] = include_bytes!("../../assets/default-album-cover.png");

impl Default for BuiltinDefaultCovers {
    fn default() -> Self {
        Self {
            music: Arc::new(png(MUSIC_COVER_PNG)),
            album: Arc::new(png(ALBUM_COVER_PNG)),
        }
    }
}

fn png(data: &[u8]) -> CoverArt {
    CoverArt {
        data: data.to_vec(),
        mime_type: "image/png".to_string(),
        source: CoverSource::Default,
    }
}

impl DefaultCoverProvider for BuiltinDefaultCovers {
    fn music_cover(&self) -> Arc<CoverArt> {
        Arc::clone(&self.music)
    }

    fn album_cover(&self) -> Arc<CoverArt> {
        Arc::clone(&self.album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::mime_from_bytes;

    #[test]
    fn test_builtin_covers_are_png() {
        let defaults = BuiltinDefaultCovers::default();
        for cover in [defaults.music_cover(), defaults.album_cover()] {
            assert_eq!(cover.source, CoverSource::Default);
            assert_eq!(mime_from_bytes(&cover.data), Some("image/png"));
        }
    }
}
