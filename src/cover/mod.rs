//! Cover art resolution and caching.
//!
//! Covers are resolved per entity with a priority search:
//!
//! 1. **Directory images** - `cover.*`, `folder.*`, ... by exact name, then
//!    by prefix, then any image
//! 2. **Embedded artwork** - the picture stored in an audio file's tags
//! 3. **Defaults** - supplied by a [`DefaultCoverProvider`]
//!
//! Tracks try their own embedded artwork before the directory. Results are
//! cached in memory for the process lifetime and persisted in the
//! `cover_cache` table so a restart can skip the search.

mod defaults;
mod embedded;
mod loader;
mod search;

pub use defaults::{BuiltinDefaultCovers, DefaultCoverProvider};
pub use embedded::load_embedded;
pub use loader::CoverLoader;
pub use search::{CoverCandidate, CoverSearcher, DEFAULT_PREFERRED_NAMES, IMAGE_EXTENSIONS};

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Cover art data ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    /// Raw image data
    pub data: Vec<u8>,
    /// MIME type (image/jpeg, image/png, ...)
    pub mime_type: String,
    /// Where this cover came from
    pub source: CoverSource,
}

/// Where a cover came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CoverSource {
    /// An image file in a directory
    ImageFile(PathBuf),
    /// Artwork embedded in an audio file
    AudioEmbedded(PathBuf),
    /// Supplied by the default cover provider
    Default,
}

/// Kind of a resolved cover location, as stored in `cover_cache.source_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoverSourceKind {
    ImageFile,
    AudioEmbedded,
}

impl CoverSourceKind {
    pub fn code(self) -> i64 {
        match self {
            CoverSourceKind::ImageFile => 1,
            CoverSourceKind::AudioEmbedded => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CoverSourceKind::ImageFile),
            2 => Some(CoverSourceKind::AudioEmbedded),
            _ => None,
        }
    }
}

/// Entity a cover is requested for. Also namespaces the cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverKind {
    /// A track, looked up by its audio file
    Music,
    /// An album, looked up by its directory
    Album,
    /// A playlist, looked up by its directory
    Playlist,
}

impl CoverKind {
    pub fn prefix(self) -> &'static str {
        match self {
            CoverKind::Music => "music",
            CoverKind::Album => "album",
            CoverKind::Playlist => "playlist",
        }
    }

    /// Cache key for `path`: `kind:path`.
    pub fn cache_key(self, path: &Path) -> String {
        format!("{}:{}", self.prefix(), path.display())
    }
}

impl std::str::FromStr for CoverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "music" | "track" => Ok(CoverKind::Music),
            "album" => Ok(CoverKind::Album),
            "playlist" => Ok(CoverKind::Playlist),
            other => Err(format!("unknown cover kind: {other}")),
        }
    }
}

/// MIME type for an image file, by extension.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// MIME type sniffed from image bytes.
pub fn mime_from_bytes(data: &[u8]) -> Option<&'static str> {
    use image::ImageFormat;

    match image::guess_format(data).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JPEG_BYTES, PNG_BYTES};

    #[test]
    fn test_cache_keys_are_namespaced() {
        let path = Path::new("/music/A/X");
        assert_eq!(CoverKind::Album.cache_key(path), "album:/music/A/X");
        assert_ne!(
            CoverKind::Album.cache_key(path),
            CoverKind::Playlist.cache_key(path)
        );
    }

    #[test]
    fn test_source_kind_codes() {
        for kind in [CoverSourceKind::ImageFile, CoverSourceKind::AudioEmbedded] {
            assert_eq!(CoverSourceKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(CoverSourceKind::from_code(0), None);
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("cover.PNG")), "image/png");
        assert_eq!(mime_from_extension(Path::new("cover.jpeg")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("cover.webp")), "image/webp");
    }

    #[test]
    fn test_mime_from_bytes() {
        assert_eq!(mime_from_bytes(PNG_BYTES), Some("image/png"));
        assert_eq!(mime_from_bytes(JPEG_BYTES), Some("image/jpeg"));
        assert_eq!(mime_from_bytes(b"plain text"), None);
    }

    #[test]
    fn test_cover_kind_parse() {
        assert_eq!("Track".parse::<CoverKind>(), Ok(CoverKind::Music));
        assert_eq!("playlist".parse::<CoverKind>(), Ok(CoverKind::Playlist));
        assert!("artist".parse::<CoverKind>().is_err());
    }
}
