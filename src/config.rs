//! Game settings, read from `snake.toml`.
//!
//! The file is looked up at `$SNAKE_CONFIG` first, then in the working
//! directory. Every key is optional and falls back to its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::direction::GridInt;
use crate::error::ConfigError;
use crate::scheduler::DEFAULT_MOVE_DELAY;

pub const CONFIG_FILE_NAME: &str = "snake.toml";
pub const CONFIG_ENV_VAR: &str = "SNAKE_CONFIG";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub speed: SpeedConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// 0 lets the front-end size the grid to the terminal.
    pub cols: GridInt,
    pub rows: GridInt,
    pub initial_length: usize,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedConfig {
    /// Frames between two steps of the snake.
    pub move_delay: u32,
    pub min_move_delay: u32,
    /// Take one frame off `move_delay` every this many foods.
    pub speedup_every: Option<u32>,
    /// Frames of warm-up after a restart before the snake moves again.
    pub restart_delay: u32,
    pub frame_ms: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Empty disables logging.
    pub file: String,
    pub filter: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { cols: 0, rows: 0, initial_length: 3 }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig {
            move_delay: DEFAULT_MOVE_DELAY,
            min_move_delay: 1,
            speedup_every: None,
            restart_delay: 180,
            frame_ms: 16,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { file: "snake.log".into(), filter: "info".into() }
    }
}

impl GameConfig {
    /// A config for a fixed-size grid with every other setting at its default.
    pub fn with_grid(cols: GridInt, rows: GridInt) -> Self {
        let mut config = GameConfig::default();
        config.grid.cols = cols;
        config.grid.rows = rows;
        config
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

        toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Loads the first config file found, or the defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match candidate_paths().into_iter().find(|path| path.exists()) {
            Some(path) => GameConfig::from_path(&path),
            None => Ok(GameConfig::default()),
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![];

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }

    paths
}
