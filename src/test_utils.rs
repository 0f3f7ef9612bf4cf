//! Test utilities and fixtures for music-shelf tests.
//!
//! Provides a throwaway database, fixture writers and a [`MockTagExtractor`]
//! so scanner and cover tests can run on plain text files instead of real
//! audio.
//!
//! # Example
//!
//! ```ignore
//! use music_shelf::test_utils::{temp_db, write_fake_audio, MockTagExtractor};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     write_fake_audio(&root.join("P/A/song.mp3"), "title=Song\nartist=Band");
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::identity;
use crate::metadata::{EmbeddedPicture, TagExtractor, TrackTags};
use crate::model::Track;

/// PNG signature followed by the start of an IHDR chunk.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";

/// JPEG SOI marker followed by an APP0 marker.
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00";

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// ```ignore
/// let (pool, _dir) = temp_db().await;
/// // Database is deleted when _dir goes out of scope
/// ```
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_url = crate::db::db_url(Some(&dir.path().join("test.db")));

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Write a fake audio file, creating parent directories.
///
/// `contents` uses the line format understood by [`MockTagExtractor`].
pub fn write_fake_audio(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(path, contents).expect("Failed to write fixture file");
}

/// A track with sensible defaults at `path`, uuid derived from the path.
pub fn track_fixture(tag_id: &str, album_id: &str, path: &str) -> Track {
    let source_path = PathBuf::from(path);
    Track {
        uuid: identity::track_uuid(Path::new("/"), &source_path),
        title: crate::db::cache::file_stem(&source_path),
        artist: Some("Test Artist".to_string()),
        album_id: album_id.to_string(),
        tag_id: tag_id.to_string(),
        source_path,
        file_modified: Some(chrono::Utc::now()),
    }
}

/// Tag extractor that reads fake audio files written by
/// [`write_fake_audio`].
///
/// Recognized lines: `title=...`, `artist=...`, `picture=png|jpeg|<raw>`.
/// Files whose name starts with `corrupt` fail to parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTagExtractor;

impl MockTagExtractor {
    fn fields(path: &Path) -> Result<Vec<(String, String)>> {
        let corrupt = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("corrupt"));
        if corrupt {
            return Err(Error::metadata(path, "corrupt test file"));
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(contents
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect())
    }

    fn field(fields: &[(String, String)], key: &str) -> Option<String> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    }
}

impl TagExtractor for MockTagExtractor {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let fields = Self::fields(path)?;
        Ok(TrackTags {
            title: Self::field(&fields, "title"),
            artist: Self::field(&fields, "artist"),
        })
    }

    fn read_picture(&self, path: &Path) -> Option<EmbeddedPicture> {
        let fields = Self::fields(path).ok()?;
        let picture = Self::field(&fields, "picture")?;
        Some(match picture.as_str() {
            "png" => EmbeddedPicture {
                data: PNG_BYTES.to_vec(),
                mime_type: Some("image/png".to_string()),
            },
            // Declared type disagrees with the bytes
            "jpeg" => EmbeddedPicture {
                data: JPEG_BYTES.to_vec(),
                mime_type: Some("image/png".to_string()),
            },
            raw => EmbeddedPicture {
                data: raw.as_bytes().to_vec(),
                mime_type: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;
        let tags = crate::db::cache::cached_tag_ids(&pool).await.unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_mock_extractor_reads_fields() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/song.mp3");
        write_fake_audio(&file, "title=Song\nartist= Band \nnoise");

        let tags = MockTagExtractor.read_tags(&file).unwrap();
        assert_eq!(tags.title.as_deref(), Some("Song"));
        assert_eq!(tags.artist.as_deref(), Some("Band"));
        assert!(MockTagExtractor.read_picture(&file).is_none());
    }

    #[test]
    fn test_mock_extractor_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("corrupt.mp3");
        write_fake_audio(&file, "title=Hidden");

        assert!(MockTagExtractor.read_tags(&file).is_err());
        assert!(MockTagExtractor.read_picture(&file).is_none());
    }

    #[test]
    fn test_track_fixture_defaults() {
        let track = track_fixture("local_P", "local_P#default", "/music/P/song.mp3");
        assert_eq!(track.title, "song");
        assert_eq!(track.uuid, identity::uuid_for_relative("music/P/song.mp3"));
    }
}
