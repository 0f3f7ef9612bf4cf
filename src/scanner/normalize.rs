//! Root normalization: loose audio files directly under the library root are
//! moved into the `default` playlist directory.
//!
//! Only the root level is handled; stray files deeper in the tree stay where
//! they are.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{files, rescan};

pub const DEFAULT_PLAYLIST_DIR: &str = "default";

/// Move every audio file directly under `root` into `root/default`.
///
/// Returns the number of files moved. A failed move is logged and skipped.
/// When anything was moved the `default` playlist's rescan flag is deleted
/// so the new files are picked up.
pub fn move_root_loose_files(root: &Path) -> usize {
    let loose = files::audio_files(root);
    if loose.is_empty() {
        return 0;
    }

    let default_dir = root.join(DEFAULT_PLAYLIST_DIR);
    if !default_dir.is_dir() {
        if let Err(e) = std::fs::create_dir_all(&default_dir) {
            warn!(dir = %default_dir.display(), error = %e, "Failed to create default playlist directory");
            return 0;
        }
        info!(dir = %default_dir.display(), "Created default playlist directory");
    }

    let moved = move_into(&default_dir, loose);
    if moved > 0 {
        info!(count = moved, "Moved loose audio files into the default playlist");
        rescan::delete_flag(&default_dir);
    }
    moved
}

/// Move each file into `dir`, continuing past failures. Returns how many
/// were moved.
fn move_into(dir: &Path, files: Vec<PathBuf>) -> usize {
    let mut moved = 0;
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = free_destination(dir, Path::new(name));
        match std::fs::rename(&file, &dest) {
            Ok(()) => {
                moved += 1;
                debug!(from = %file.display(), to = %dest.display(), "Moved loose file");
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Failed to move loose file");
            }
        }
    }
    moved
}

/// First path in `dir` for `name` that does not exist yet, appending
/// `_1`, `_2`, ... to the stem on collision.
fn free_destination(dir: &Path, name: &Path) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_moves_loose_files_into_default() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("track.mp3"), b"audio").unwrap();
        fs::write(root.join("readme.txt"), b"text").unwrap();

        assert_eq!(move_root_loose_files(root), 1);
        assert!(!root.join("track.mp3").exists());
        assert!(root.join("default").join("track.mp3").exists());
        // Non-audio files stay
        assert!(root.join("readme.txt").exists());
    }

    #[test]
    fn test_collision_appends_suffix() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let default_dir = root.join(DEFAULT_PLAYLIST_DIR);
        fs::create_dir(&default_dir).unwrap();
        fs::write(default_dir.join("song.mp3"), b"old").unwrap();
        fs::write(default_dir.join("song_1.mp3"), b"older").unwrap();
        fs::write(root.join("song.mp3"), b"new").unwrap();

        assert_eq!(move_root_loose_files(root), 1);
        assert_eq!(fs::read(default_dir.join("song_2.mp3")).unwrap(), b"new");
        assert_eq!(fs::read(default_dir.join("song.mp3")).unwrap(), b"old");
    }

    #[test]
    fn test_failed_move_does_not_stop_batch() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let default_dir = root.join(DEFAULT_PLAYLIST_DIR);
        fs::create_dir(&default_dir).unwrap();
        fs::write(root.join("a.mp3"), b"a").unwrap();
        fs::write(root.join("c.mp3"), b"c").unwrap();

        // b.mp3 vanished between listing and moving
        let batch = vec![root.join("a.mp3"), root.join("b.mp3"), root.join("c.mp3")];
        assert_eq!(move_into(&default_dir, batch), 2);

        assert_eq!(fs::read(default_dir.join("a.mp3")).unwrap(), b"a");
        assert_eq!(fs::read(default_dir.join("c.mp3")).unwrap(), b"c");
        assert!(!default_dir.join("b.mp3").exists());
    }

    #[test]
    fn test_move_deletes_default_rescan_flag() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let default_dir = root.join(DEFAULT_PLAYLIST_DIR);
        fs::create_dir(&default_dir).unwrap();
        rescan::create_flag(&default_dir);
        fs::write(root.join("new.flac"), b"audio").unwrap();

        move_root_loose_files(root);
        assert!(rescan::needs_rescan(&default_dir));
    }

    #[test]
    fn test_nothing_to_move_keeps_flag() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let default_dir = root.join(DEFAULT_PLAYLIST_DIR);
        fs::create_dir(&default_dir).unwrap();
        rescan::create_flag(&default_dir);

        assert_eq!(move_root_loose_files(root), 0);
        assert!(!rescan::needs_rescan(&default_dir));
    }
}
