use std::path::PathBuf;

use thiserror::Error;

use crate::direction::GridInt;

/// Reasons a board can't be set up. Nothing fails once a round is running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid { cols: GridInt, rows: GridInt },

    #[error("initial snake length must be at least 1")]
    ZeroLength,

    #[error("a snake of length {length} does not fit a {cols}x{rows} grid")]
    GridTooSmall { cols: GridInt, rows: GridInt, length: usize },

    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
