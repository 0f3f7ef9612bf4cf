//! Favorites, exclusions and play stats.

use tokio::runtime::Runtime;
use uuid::Uuid;

use super::open_library;
use crate::config::Config;
use crate::db::Mark;

/// Set or clear a favorite/excluded mark
pub fn cmd_mark(rt: &Runtime, config: &Config, mark: Mark, uuid: &Uuid, value: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        match mark {
            Mark::Favorite => library.set_favorite(uuid, value).await?,
            Mark::Excluded => library.set_excluded(uuid, value).await?,
        }
        if value {
            println!("Marked {uuid} as {mark}");
        } else {
            println!("Cleared {mark} mark of {uuid}");
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Record one play of a track
pub fn cmd_play(rt: &Runtime, config: &Config, uuid: &Uuid) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        library.record_play(uuid).await?;
        let stats = library.play_stats(uuid).await?;
        println!("{uuid}: played {} times", stats.play_count);
        Ok::<_, anyhow::Error>(())
    })
}

/// Show play stats and marks of a track
pub fn cmd_stats(rt: &Runtime, config: &Config, uuid: &Uuid) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config).await?;
        let stats = library.play_stats(uuid).await?;

        println!("Track:       {uuid}");
        println!("Plays:       {}", stats.play_count);
        match stats.last_played {
            Some(at) => println!("Last played: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("Last played: never"),
        }
        println!("Favorite:    {}", library.is_favorite(uuid).await?);
        println!("Excluded:    {}", library.is_excluded(uuid).await?);
        Ok::<_, anyhow::Error>(())
    })
}
