//! Config file command.

use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

/// Print the effective config, or write a default config file
pub fn cmd_config(
    rt: &Runtime,
    path: Option<&PathBuf>,
    effective: &Config,
    init: bool,
) -> anyhow::Result<()> {
    if !init {
        print!("{}", toml::to_string_pretty(effective)?);
        return Ok(());
    }

    let target = match path {
        Some(p) => p.clone(),
        None => config::config_path().ok_or(config::ConfigError::NoConfigDir)?,
    };
    if target.exists() {
        println!("Config file already exists: {}", target.display());
        return Ok(());
    }

    match path {
        Some(p) => config::save_to(&Config::default(), p)?,
        None => {
            rt.block_on(config::save_async(Config::default()))?;
        }
    }
    println!("Wrote default config to {}", target.display());
    Ok(())
}
