//! Music Shelf - a folder-based music library.
//!
//! Indexes a directory tree of audio files into playlists, albums and
//! tracks, keeps that index in a SQLite cache so repeated scans are cheap,
//! and resolves cover art through a prioritized, cached search.
//!
//! ```ignore
//! let library = LocalLibrary::open(&music_shelf::config::load()).await?;
//! let outcome = library.scan().await;
//! for track in &outcome.result.tracks {
//!     println!("{} {}", track.uuid, track.title);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod cover;
pub mod db;
pub mod error;
pub mod identity;
pub mod library;
pub mod metadata;
pub mod model;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

pub use library::LocalLibrary;
