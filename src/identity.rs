//! Deterministic identifiers for playlists, albums and tracks.
//!
//! Track identity is content-addressed from the file's path relative to the
//! library root: the relative path is separator- and case-normalized, hashed
//! with SHA-256 and the first 128 bits are used as a UUID. Relocating the
//! whole root keeps every uuid; renaming or moving a file inside the root
//! produces a new one.

use sha2::{Digest, Sha256};
use std::path::{Component, Path};
use uuid::Uuid;

/// Prefix for playlist tag ids.
const TAG_PREFIX: &str = "local_";

/// Suffix marking the synthetic default album of a playlist.
///
/// Regular album ids use `/` as separator, which cannot occur in a directory
/// name, so the two forms never collide.
const DEFAULT_ALBUM_SUFFIX: &str = "#default";

/// Tag id for a playlist directory name.
pub fn tag_id(dir_name: &str) -> String {
    format!("{TAG_PREFIX}{dir_name}")
}

/// Album id for an album directory inside a playlist.
pub fn album_id(tag_id: &str, album_dir_name: &str) -> String {
    format!("{tag_id}/{album_dir_name}")
}

/// Album id of the playlist's default album (loose files).
pub fn default_album_id(tag_id: &str) -> String {
    format!("{tag_id}{DEFAULT_ALBUM_SUFFIX}")
}

/// Normalize a relative path string: `\` becomes `/`, empty segments are
/// dropped and the result is lowercased.
pub fn normalize_key(relative: &str) -> String {
    relative
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}

/// Normalized key of `file` relative to `root`.
///
/// Falls back to the full path when `file` is not under `root`.
pub fn relative_key(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    normalize_key(&joined)
}

/// Uuid for an already relative path.
pub fn uuid_for_relative(relative: &str) -> Uuid {
    let digest = Sha256::digest(normalize_key(relative).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Uuid for an audio file under the library root.
pub fn track_uuid(root: &Path, file: &Path) -> Uuid {
    uuid_for_relative(&relative_key(root, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_ids() {
        let tag = tag_id("Chill");
        assert_eq!(tag, "local_Chill");
        assert_eq!(album_id(&tag, "Night"), "local_Chill/Night");
        assert_eq!(default_album_id(&tag), "local_Chill#default");
        assert_ne!(album_id(&tag, "default"), default_album_id(&tag));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("\\PlaylistA\\AlbumX\\Song1.MP3"), "playlista/albumx/song1.mp3");
        assert_eq!(normalize_key("a//b/"), "a/b");
    }

    #[test]
    fn test_relative_key_strips_root() {
        let root = Path::new("/music/library");
        let file = root.join("PlaylistA").join("loose.mp3");
        assert_eq!(relative_key(root, &file), "playlista/loose.mp3");
    }

    #[test]
    fn test_relative_key_outside_root_uses_full_path() {
        let key = relative_key(Path::new("/music"), Path::new("/other/song.mp3"));
        assert_eq!(key, "other/song.mp3");
    }

    #[test]
    fn test_distinct_paths_distinct_uuids() {
        let a = uuid_for_relative("PlaylistA/AlbumX/song1.mp3");
        let b = uuid_for_relative("PlaylistA/AlbumX/song2.mp3");
        assert_ne!(a, b);
    }

    #[test]
    fn test_uuid_is_stable() {
        // Case differences map to the same track.
        let first = uuid_for_relative("PlaylistA/AlbumX/song1.mp3");
        let second = uuid_for_relative("playlista/albumx/song1.mp3");
        assert_eq!(first, second);
        assert_eq!(first.to_string().len(), 36);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 _.-]{1,12}".prop_filter("not a dot segment", |s| s != "." && s != "..")
    }

    proptest! {
        #[test]
        fn prop_case_and_separator_insensitive(segments in prop::collection::vec(segment(), 1..5)) {
            let forward = segments.join("/");
            let backward = segments.join("\\").to_uppercase();
            prop_assert_eq!(uuid_for_relative(&forward), uuid_for_relative(&backward));
        }

        #[test]
        fn prop_root_relocation_keeps_uuid(segments in prop::collection::vec(segment(), 1..5)) {
            let relative: PathBuf = segments.iter().collect();
            let old_root = Path::new("/mnt/old/music");
            let new_root = Path::new("/home/user/Music/library");
            prop_assert_eq!(
                track_uuid(old_root, &old_root.join(&relative)),
                track_uuid(new_root, &new_root.join(&relative))
            );
        }
    }
}
