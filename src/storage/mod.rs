//! File-backed tournament store.
//!
//! Each tournament lives in its own directory under the data dir:
//! - JSONL files for competitors, matchups, results, byes and group assignments
//! - `locked_rounds.json` for the lock state
//!
//! The engine never touches these files itself; the CLI loads a snapshot
//! before a request and writes confirmed rounds after it.

mod jsonl;
mod store;

pub use jsonl::*;
pub use store::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tournaments_dir(&self) -> PathBuf {
        self.data_dir.join("tournaments")
    }

    pub fn tournament_dir(&self, tournament_id: &str) -> PathBuf {
        self.tournaments_dir().join(tournament_id)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
