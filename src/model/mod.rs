//! Core data models for the folder library.
//!
//! The library is a three-level hierarchy derived from the directory tree:
//! - [`Playlist`] - one per top-level subdirectory of the root
//! - [`Album`] - one per playlist subdirectory, plus a synthetic default
//!   album for loose files directly inside the playlist directory
//! - [`Track`] - one per discovered audio file
//!
//! A [`ScanResult`] is the snapshot produced by one scan pass. It is the
//! ground truth used by orphan cleanup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use uuid::Uuid;

/// A playlist (top-level directory under the library root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    /// Stable id derived from the directory name
    pub tag_id: String,
    /// `playlist.json` override, else the directory name
    pub display_name: String,
    pub directory_path: PathBuf,
}

/// An album inside a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub album_id: String,
    pub display_name: String,
    /// `album.json` override, else the first track's artist
    pub artist: Option<String>,
    /// Parent playlist
    pub tag_id: String,
    /// For the default album this is the playlist directory itself
    pub directory_path: PathBuf,
    pub is_default: bool,
}

/// A track (audio file) in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Derived from the root-relative path, see [`crate::identity::track_uuid`]
    pub uuid: Uuid,
    /// Tag title, or the file stem when the tag has none
    pub title: String,
    pub artist: Option<String>,
    pub album_id: String,
    pub tag_id: String,
    pub source_path: PathBuf,
    /// Last-known modification time of the file
    pub file_modified: Option<DateTime<Utc>>,
}

/// Snapshot of the library produced by a scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub playlists: Vec<Playlist>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

impl ScanResult {
    /// Uuids of every track in the snapshot.
    pub fn valid_uuids(&self) -> HashSet<Uuid> {
        self.tracks.iter().map(|t| t.uuid).collect()
    }

    /// Tag ids of every playlist in the snapshot.
    pub fn valid_tag_ids(&self) -> HashSet<String> {
        self.playlists.iter().map(|p| p.tag_id.clone()).collect()
    }

    pub fn track(&self, uuid: &Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.uuid == uuid)
    }

    pub fn album(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.album_id == album_id)
    }

    pub fn playlist(&self, tag_id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.tag_id == tag_id)
    }

    /// Tracks belonging to one album, in scan order.
    pub fn tracks_in_album<'a>(&'a self, album_id: &'a str) -> impl Iterator<Item = &'a Track> {
        self.tracks.iter().filter(move |t| t.album_id == album_id)
    }

    /// Sort every list by its id so two snapshots can be compared
    /// independent of discovery order.
    pub fn sorted(mut self) -> Self {
        self.playlists.sort_by(|a, b| a.tag_id.cmp(&b.tag_id));
        self.albums.sort_by(|a, b| a.album_id.cmp(&b.album_id));
        self.tracks.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uuid: Uuid, album_id: &str) -> Track {
        Track {
            uuid,
            title: "Song".to_string(),
            artist: None,
            album_id: album_id.to_string(),
            tag_id: "local_A".to_string(),
            source_path: PathBuf::from("/music/A/song.mp3"),
            file_modified: None,
        }
    }

    #[test]
    fn test_valid_sets() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let result = ScanResult {
            playlists: vec![Playlist {
                tag_id: "local_A".to_string(),
                display_name: "A".to_string(),
                directory_path: PathBuf::from("/music/A"),
            }],
            albums: vec![],
            tracks: vec![track(a, "x"), track(b, "y")],
        };

        assert_eq!(result.valid_uuids(), HashSet::from([a, b]));
        assert!(result.valid_tag_ids().contains("local_A"));
        assert_eq!(result.tracks_in_album("x").count(), 1);
        assert!(result.track(&b).is_some());
    }

    #[test]
    fn test_sorted_is_order_insensitive() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let first = ScanResult {
            tracks: vec![track(a, "x"), track(b, "x")],
            ..Default::default()
        };
        let second = ScanResult {
            tracks: vec![track(b, "x"), track(a, "x")],
            ..Default::default()
        };
        assert_ne!(first, second);
        assert_eq!(first.sorted(), second.sorted());
    }
}
