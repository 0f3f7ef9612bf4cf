//! Directory enumeration helpers.
//!
//! All listings are sorted by file name so scans are deterministic.
//! Unreadable directories are logged and treated as empty.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Recognized audio extensions (lowercase). `egg` is the engine's renamed
/// Ogg Vorbis variant.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "egg", "flac", "aiff", "aif", "m4a"];

/// Check if a path has an audio file extension (case-insensitive).
pub fn is_audio_file(path: &Path) -> bool {
    has_extension(path, AUDIO_EXTENSIONS)
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Regular files directly inside `dir`.
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    list(dir, |p| p.is_file())
}

/// Subdirectories directly inside `dir`.
pub fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    list(dir, |p| p.is_dir())
}

/// Audio files directly inside `dir`.
pub fn audio_files(dir: &Path) -> Vec<PathBuf> {
    files_in(dir).into_iter().filter(|p| is_audio_file(p)).collect()
}

/// Audio files in `dir` and its subdirectories down to `max_depth` levels
/// below `dir`. Files of a directory come before those of its children.
pub fn audio_files_recursive(dir: &Path, max_depth: usize) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth + 1)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn list(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| keep(p))
        .collect();
    paths.sort();
    paths
}
