//! Per-directory descriptor files (`playlist.json`, `album.json`).
//!
//! They let a human override a playlist's or album's display name and an
//! album's artist. A missing or malformed file reads as "no override"; write
//! failures are logged and ignored.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const PLAYLIST_JSON: &str = "playlist.json";
pub const ALBUM_JSON: &str = "album.json";

/// Contents of `playlist.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Contents of `album.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

pub fn read_playlist(dir: &Path) -> PlaylistMetadata {
    read_json(&dir.join(PLAYLIST_JSON)).unwrap_or_default()
}

pub fn read_album(dir: &Path) -> AlbumMetadata {
    read_json(&dir.join(ALBUM_JSON)).unwrap_or_default()
}

/// Create `playlist.json` with `display_name` if it does not exist yet.
pub fn ensure_playlist(dir: &Path, display_name: &str) {
    let path = dir.join(PLAYLIST_JSON);
    if !path.exists() {
        write_json(
            &path,
            &PlaylistMetadata {
                display_name: Some(display_name.to_string()),
            },
        );
    }
}

/// Create `album.json` with the computed defaults if it does not exist yet.
pub fn ensure_album(dir: &Path, display_name: &str, artist: Option<&str>) {
    let path = dir.join(ALBUM_JSON);
    if !path.exists() {
        write_json(
            &path,
            &AlbumMetadata {
                display_name: Some(display_name.to_string()),
                artist: artist.map(str::to_string),
            },
        );
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Ignoring malformed sidecar file");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) {
    let result = serde_json::to_string_pretty(value)
        .map_err(std::io::Error::other)
        .and_then(|json| std::fs::write(path, json));
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Failed to write sidecar file");
    }
}
