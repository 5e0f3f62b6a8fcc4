//! Error types for the game server.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the pattern catalog. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read pattern catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pattern catalog contains no patterns")]
    Empty,

    #[error("pattern {index} ({name}) has no rows")]
    EmptyPattern { index: usize, name: String },

    #[error("pattern {index} ({name}) is not rectangular: row {row} has the wrong width")]
    Ragged {
        index: usize,
        name: String,
        row: usize,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no history entry at index {index} (history holds {len})")]
    NotFound { index: usize, len: usize },

    #[error("failed to persist history to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid pattern index {index}, catalog holds {total}")]
    InvalidIndex { index: i64, total: usize },

    #[error(transparent)]
    History(#[from] HistoryError),
}
