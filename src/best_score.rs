//! Best-score persistence: one integer in a text file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::StoreError;

pub const DEFAULT_BEST_SCORE_FILE: &str = "bestscore.txt";

#[derive(Clone, Debug)]
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as 0.
    pub fn load(&self) -> Result<u32, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        contents.trim().parse().map_err(|_| StoreError::Corrupt {
            path: self.path.clone(),
            contents,
        })
    }

    pub fn save(&self, score: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, score.to_string())?;
        debug!("saved best score {score} to {}", self.path.display());
        Ok(())
    }

    /// Saves `score` only if it beats the stored value; returns the best of the two.
    pub fn record(&self, score: u32) -> Result<u32, StoreError> {
        let stored = self.load()?;
        if score > stored {
            self.save(score)?;
            Ok(score)
        } else {
            Ok(stored)
        }
    }
}

impl Default for BestScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_BEST_SCORE_FILE)
    }
}
