//! Append-only log of winning submissions
//!
//! Entries are cached in memory and, when the store is backed by a file, the
//! whole log is rewritten as a JSON array after each append. An append only
//! becomes visible once the file write has succeeded: on failure the entry is
//! dropped again and the error is returned to the caller.

use crate::error::HistoryError;
use log::{debug, warn};
use shared::{HistoryEntry, ScoreEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct HistoryStore {
    path: Option<PathBuf>,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Opens a file-backed store.
    ///
    /// A missing or unreadable file starts an empty history rather than
    /// failing; the file is created on the first append.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => {
                    debug!("Loaded {} history entries from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    warn!("Ignoring unreadable history file {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("No history loaded from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self {
            path: Some(path),
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends an entry and returns its index.
    pub async fn append(&self, entry: HistoryEntry) -> Result<usize, HistoryError> {
        let mut entries = self.entries.write().await;
        entries.push(entry);

        if let Some(path) = &self.path {
            if let Err(e) = persist(path, &entries).await {
                entries.pop();
                return Err(e);
            }
        }

        Ok(entries.len() - 1)
    }

    pub async fn all(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let entries = self.entries.read().await;
        entries.get(index).cloned().ok_or(HistoryError::NotFound {
            index,
            len: entries.len(),
        })
    }

    /// Up to `count` entries, newest first.
    pub async fn recent(&self, count: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(count).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Players ranked by number of wins, ties broken by name.
    pub async fn leaderboard(&self, count: usize) -> Vec<ScoreEntry> {
        let entries = self.entries.read().await;

        let mut wins: HashMap<&str, u32> = HashMap::new();
        for entry in entries.iter() {
            *wins.entry(entry.name.as_str()).or_insert(0) += 1;
        }

        let mut scores: Vec<ScoreEntry> = wins
            .into_iter()
            .map(|(name, score)| ScoreEntry {
                name: name.to_string(),
                score,
            })
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        scores.truncate(count);
        scores
    }
}

/// Writes the full log next to `path` and renames it into place.
async fn persist(path: &Path, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
    let data = serde_json::to_vec_pretty(entries)?;
    let io_err = |source: std::io::Error| HistoryError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, data).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;
    Ok(())
}
