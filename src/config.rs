//! TOML configuration.
//!
//! The default file lives in the OS config directory:
//! - Windows: %APPDATA%\music-shelf\config.toml
//! - macOS: ~/Library/Application Support/music-shelf/config.toml
//! - Linux: ~/.config/music-shelf/config.toml
//!
//! The config file is human-readable and editable. Missing fields take
//! their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cover::DEFAULT_PREFERRED_NAMES;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library folder settings
    pub library: LibraryConfig,

    /// Persistent cache settings
    pub cache: CacheConfig,

    /// Cover resolution settings
    pub covers: CoverConfig,
}

/// Library folder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directory whose subdirectories are playlists
    pub root_folder: PathBuf,

    /// Ignore rescan flags and fully scan every playlist
    pub force_rescan: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root_folder: dirs::audio_dir()
                .map(|d| d.join("music-shelf"))
                .unwrap_or_else(|| PathBuf::from("music")),
            force_rescan: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: dirs::data_dir()
                .map(|d| d.join("music-shelf").join("library.db"))
                .unwrap_or_else(|| PathBuf::from("library.db")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Image base names tried in order when searching a directory
    pub preferred_names: Vec<String>,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            preferred_names: DEFAULT_PREFERRED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `music-shelf` under the OS config directory
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-shelf"))
}

/// Default config file location
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location, never failing.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            warn!("No OS config directory, using default config");
            Config::default()
        }
    }
}

/// Load configuration from `path`. A missing, unreadable or malformed file
/// yields the defaults.
pub fn load_from(path: &Path) -> Config {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            return Config::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable config file, using defaults");
            return Config::default();
        }
    };

    toml::from_str(&contents)
        .inspect(|_| info!(path = %path.display(), "Loaded config"))
        .unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
            Config::default()
        })
}

/// Save configuration to the default location and return where it went.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`, creating its directory.
///
/// Written to a sibling `.toml.tmp` file, then renamed over the target.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let contents = toml::to_string_pretty(config)?;
    let staging = path.with_extension("toml.tmp");
    std::fs::write(&staging, contents).map_err(|source| ConfigError::Write {
        path: staging.clone(),
        source,
    })?;
    std::fs::rename(&staging, path).map_err(|source| ConfigError::Rename {
        from: staging,
        to: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Saved config");
    Ok(())
}

/// [`save`] on the blocking pool.
pub async fn save_async(config: Config) -> Result<PathBuf, ConfigError> {
    tokio::task::spawn_blocking(move || save(&config)).await?
}

/// Config file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OS config directory is unknown")]
    NoConfigDir,

    #[error("Cannot create {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Cannot move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Config save task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

// ============================================================================
// Tests
// ============================================================================
