//! Library scanning and listing commands.

use std::collections::HashSet;
use tokio::runtime::Runtime;

use super::open_library;
use crate::config::Config;
use crate::scanner::ScanOutcome;

/// Scan the library and print a summary
pub fn cmd_scan(rt: &Runtime, config: &Config, force: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        println!("Scanning library: {}", library.root().display());

        let outcome = if force {
            library.refresh().await
        } else {
            library.scan().await
        };
        print_outcome(&outcome);
        Ok::<_, anyhow::Error>(())
    })
}

/// List playlists, albums and tracks
pub fn cmd_list(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        let outcome = library.scan().await;
        let favorites: HashSet<_> = library.favorites().await?.into_iter().collect();
        let excluded: HashSet<_> = library.excluded().await?.into_iter().collect();

        let result = &outcome.result;
        for playlist in &result.playlists {
            println!("{} [{}]", playlist.display_name, playlist.tag_id);
            for album in result.albums.iter().filter(|a| a.tag_id == playlist.tag_id) {
                let count = result.tracks_in_album(&album.album_id).count();
                match &album.artist {
                    Some(artist) => println!("  {} - {} ({} tracks)", album.display_name, artist, count),
                    None => println!("  {} ({} tracks)", album.display_name, count),
                }
                for track in result.tracks_in_album(&album.album_id) {
                    let mark = match (favorites.contains(&track.uuid), excluded.contains(&track.uuid)) {
                        (_, true) => 'x',
                        (true, false) => '*',
                        (false, false) => ' ',
                    };
                    println!(
                        "   {} {}  {}{}",
                        mark,
                        track.uuid,
                        track.title,
                        track
                            .artist
                            .as_deref()
                            .map(|a| format!(" - {a}"))
                            .unwrap_or_default()
                    );
                }
            }
        }

        for failure in &outcome.cache_failures {
            eprintln!("Cache error ({}): {}", failure.scope, failure.error);
        }
        Ok::<_, anyhow::Error>(())
    })
}

fn print_outcome(outcome: &ScanOutcome) {
    let result = &outcome.result;
    println!(
        "Scan complete: {} playlists, {} albums, {} tracks.",
        result.playlists.len(),
        result.albums.len(),
        result.tracks.len()
    );
    for failure in &outcome.cache_failures {
        eprintln!("Cache error ({}): {}", failure.scope, failure.error);
    }
}
