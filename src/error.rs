use std::io;
use std::path::PathBuf;

use crate::engine::GRID_SIZE;

/// Rejected attempts to build a [`Grid`](crate::engine::Grid) from untrusted rows or text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have {} rows, got {0}", GRID_SIZE)]
    RowCount(usize),
    #[error("row {row} must have {} cells, got {len}", GRID_SIZE)]
    RowLength { row: usize, len: usize },
    #[error("cell ({row}, {col}) holds {value}, expected 0 or a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("cannot parse cell value {0:?}")]
    Token(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown direction {0:?} (expected up, down, left or right)")]
    Direction(String),
    #[error("unknown spawn policy {0:?} (expected classic or extended)")]
    SpawnPolicy(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target tile {0} must be a power of two >= 4")]
    InvalidTarget(u32),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("best score file {path} is corrupt: {contents:?}")]
    Corrupt { path: PathBuf, contents: String },
}
