//! Cover resolution command.

use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use super::open_library;
use crate::config::Config;
use crate::cover::{CoverKind, CoverSource};

/// Resolve a cover and optionally write it to a file
pub fn cmd_cover(
    rt: &Runtime,
    config: &Config,
    path: &Path,
    kind: CoverKind,
    out: Option<&PathBuf>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        let art = match kind {
            CoverKind::Music => library.music_cover(path).await,
            CoverKind::Album => library.album_cover(path).await,
            CoverKind::Playlist => library.playlist_cover(path).await,
        };

        match &art.source {
            CoverSource::ImageFile(p) => println!("Image file: {}", p.display()),
            CoverSource::AudioEmbedded(p) => println!("Embedded in: {}", p.display()),
            CoverSource::Default => println!("No cover found, using the default"),
        }
        println!("{} ({} bytes)", art.mime_type, art.data.len());

        if let Some(out) = out {
            tokio::fs::write(out, &art.data).await?;
            println!("Wrote {}", out.display());
        }
        Ok::<_, anyhow::Error>(())
    })
}
