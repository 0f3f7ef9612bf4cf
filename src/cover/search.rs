//! Priority search for a cover inside one directory.

use std::path::{Path, PathBuf};

use super::CoverSourceKind;
use crate::scanner::files;

/// Base names tried in order, case-insensitive.
pub const DEFAULT_PREFERRED_NAMES: &[&str] = &["cover", "folder", "front", "album", "thumb"];

/// Supported image extensions (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// A location that may hold a cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverCandidate {
    pub path: PathBuf,
    pub kind: CoverSourceKind,
}

impl CoverCandidate {
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: CoverSourceKind::ImageFile,
        }
    }

    pub fn embedded(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: CoverSourceKind::AudioEmbedded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoverSearcher {
    preferred_names: Vec<String>,
}

impl Default for CoverSearcher {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERRED_NAMES.iter().map(|s| s.to_string()))
    }
}

impl CoverSearcher {
    pub fn new(preferred_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            preferred_names: preferred_names
                .into_iter()
                .map(|n| n.to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Best image file in `dir`: exact base-name match in preference order,
    /// then prefix match, then the first image by name.
    pub fn search_directory(&self, dir: &Path) -> Option<CoverCandidate> {
        let images: Vec<(PathBuf, String)> = files::files_in(dir)
            .into_iter()
            .filter(|p| files::has_extension(p, IMAGE_EXTENSIONS))
            .map(|p| {
                let stem = p
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                (p, stem)
            })
            .collect();

        if images.is_empty() {
            return None;
        }

        let exact = self
            .preferred_names
            .iter()
            .find_map(|name| images.iter().find(|(_, stem)| stem == name));
        let prefix = || {
            self.preferred_names
                .iter()
                .find_map(|name| images.iter().find(|(_, stem)| stem.starts_with(name.as_str())))
        };

        exact
            .or_else(prefix)
            .or_else(|| images.first())
            .map(|(path, _)| CoverCandidate::image(path.clone()))
    }

    /// Like [`search_directory`](Self::search_directory), falling back to
    /// the first audio file of `dir` as an embedded-artwork candidate.
    pub fn search_directory_with_audio(&self, dir: &Path) -> Option<CoverCandidate> {
        self.search_directory(dir).or_else(|| {
            files::audio_files(dir)
                .into_iter()
                .next()
                .map(CoverCandidate::embedded)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn found(candidate: Option<CoverCandidate>) -> Option<String> {
        candidate.map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
    }

    #[test]
    fn test_preferred_name_beats_arbitrary_image() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "random.jpg");
        touch(dir.path(), "Front.png");

        let searcher = CoverSearcher::default();
        assert_eq!(found(searcher.search_directory(dir.path())).as_deref(), Some("Front.png"));
    }

    #[test]
    fn test_exact_match_beats_prefix_of_earlier_name() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cover_back.jpg");
        touch(dir.path(), "folder.jpg");

        let searcher = CoverSearcher::default();
        assert_eq!(found(searcher.search_directory(dir.path())).as_deref(), Some("folder.jpg"));
    }

    #[test]
    fn test_prefix_match_in_preference_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "album_art.png");
        touch(dir.path(), "Cover (1).jpg");

        let searcher = CoverSearcher::default();
        assert_eq!(found(searcher.search_directory(dir.path())).as_deref(), Some("Cover (1).jpg"));
    }

    #[test]
    fn test_first_image_by_name_as_last_resort() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "zebra.webp");
        touch(dir.path(), "artwork.gif");
        touch(dir.path(), "notes.txt");

        let searcher = CoverSearcher::default();
        assert_eq!(found(searcher.search_directory(dir.path())).as_deref(), Some("artwork.gif"));
    }

    #[test]
    fn test_image_only_search_ignores_audio() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "song.mp3");

        let searcher = CoverSearcher::default();
        assert_eq!(searcher.search_directory(dir.path()), None);
    }

    #[test]
    fn test_audio_fallback_returns_first_audio_file() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.flac");
        touch(dir.path(), "a.mp3");

        let candidate = CoverSearcher::default()
            .search_directory_with_audio(dir.path())
            .unwrap();
        assert_eq!(candidate.kind, CoverSourceKind::AudioEmbedded);
        assert_eq!(candidate.path, dir.path().join("a.mp3"));
    }

    #[test]
    fn test_empty_or_missing_directory() {
        let dir = tempdir().unwrap();
        let searcher = CoverSearcher::default();
        assert_eq!(searcher.search_directory_with_audio(dir.path()), None);
        assert_eq!(searcher.search_directory(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_custom_preferred_names() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cover.jpg");
        touch(dir.path(), "Poster.png");

        let searcher = CoverSearcher::new(["poster".to_string()]);
        assert_eq!(found(searcher.search_directory(dir.path())).as_deref(), Some("Poster.png"));
    }
}
