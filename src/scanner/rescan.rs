//! Per-playlist "already scanned" marker.
//!
//! The marker file is written after a successful full scan of a playlist.
//! While it exists the playlist is loaded from the cache; deleting it forces
//! a full rescan on the next run.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const RESCAN_FLAG: &str = "!rescan_playlist";

pub fn flag_path(playlist_dir: &Path) -> PathBuf {
    playlist_dir.join(RESCAN_FLAG)
}

/// True when the marker is missing.
pub fn needs_rescan(playlist_dir: &Path) -> bool {
    !flag_path(playlist_dir).is_file()
}

pub fn create_flag(playlist_dir: &Path) {
    let contents = format!(
        "# Playlist scan marker\n\
         # This playlist has been fully scanned and is loaded from the cache.\n\
         # Delete this file to rescan it on the next start.\n\
         \n\
         Created: {}\n",
        Utc::now().to_rfc3339()
    );
    if let Err(e) = std::fs::write(flag_path(playlist_dir), contents) {
        warn!(dir = %playlist_dir.display(), error = %e, "Failed to create rescan flag");
    }
}

pub fn delete_flag(playlist_dir: &Path) {
    let path = flag_path(playlist_dir);
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(&path) {
        warn!(dir = %playlist_dir.display(), error = %e, "Failed to delete rescan flag");
    }
}
