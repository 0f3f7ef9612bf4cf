//! CLI command definitions and dispatch.
//!
//! Each group of subcommands is implemented in its own submodule:
//! - `scan`: scanning, refreshing and listing the library
//! - `cover`: cover resolution
//! - `state`: favorites, exclusions and play stats
//! - `settings`: the config file

mod cover;
mod scan;
mod settings;
mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use uuid::Uuid;

use crate::config::{self, Config};
use crate::cover::CoverKind;
use crate::db::Mark;
use crate::library::LocalLibrary;

pub use cover::cmd_cover;
pub use scan::{cmd_list, cmd_scan};
pub use settings::cmd_config;
pub use state::{cmd_mark, cmd_play, cmd_stats};

/// Music Shelf CLI
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Library root folder, overriding the config file
    #[arg(long, global = true, env = "MUSIC_SHELF_ROOT")]
    pub root: Option<PathBuf>,

    /// Cache database path, overriding the config file
    #[arg(long, global = true, env = "MUSIC_SHELF_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the library, loading already scanned playlists from the cache
    Scan {
        /// Fully rescan every playlist
        #[arg(long)]
        force: bool,
    },
    /// Fully rescan every playlist
    Refresh,
    /// List playlists, albums and tracks
    List,
    /// Resolve the cover of a track, album or playlist
    Cover {
        /// Audio file (music) or directory (album, playlist)
        path: PathBuf,
        /// What the path refers to: music, album or playlist
        #[arg(short, long, default_value = "music")]
        kind: CoverKind,
        /// Write the image to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Mark a track as favorite
    Favorite {
        uuid: Uuid,
        /// Remove the mark instead
        #[arg(long)]
        remove: bool,
    },
    /// Exclude a track from playback
    Exclude {
        uuid: Uuid,
        /// Remove the mark instead
        #[arg(long)]
        remove: bool,
    },
    /// Record one play of a track
    Play { uuid: Uuid },
    /// Show play stats and marks of a track
    Stats { uuid: Uuid },
    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = effective_config(cli);

    match &cli.command {
        Commands::Scan { force } => cmd_scan(&rt, &config, *force),
        Commands::Refresh => cmd_scan(&rt, &config, true),
        Commands::List => cmd_list(&rt, &config),
        Commands::Cover { path, kind, out } => cmd_cover(&rt, &config, path, *kind, out.as_ref()),
        Commands::Favorite { uuid, remove } => cmd_mark(&rt, &config, Mark::Favorite, uuid, !remove),
        Commands::Exclude { uuid, remove } => cmd_mark(&rt, &config, Mark::Excluded, uuid, !remove),
        Commands::Play { uuid } => cmd_play(&rt, &config, uuid),
        Commands::Stats { uuid } => cmd_stats(&rt, &config, uuid),
        Commands::Config { init } => cmd_config(&rt, cli.config.as_ref(), &config, *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config file contents with command-line overrides applied.
pub(crate) fn effective_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(root) = &cli.root {
        config.library.root_folder = root.clone();
    }
    if let Some(db) = &cli.db {
        config.cache.database_path = db.clone();
    }
    config
}

pub(crate) async fn open_library(config: &Config) -> anyhow::Result<LocalLibrary> {
    Ok(LocalLibrary::open(config).await?)
}
