//! Persistence mirror for the task list
//!
//! The whole list is stored as one JSON array under a fixed key:
//!
//! ```json
//! [{"id":"...","text":"buy milk","completed":false,"createdAt":"2024-05-01T12:30:00.000Z"}]
//! ```
//!
//! Loading never fails: a missing key is an empty list, and an unreadable
//! store or malformed value is logged and treated as an empty list. Values
//! that are not UTF-8 count as malformed and are set aside byte for byte.

use std::collections::HashSet;

use keystore::{KeyValueStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::Task;

/// Default key the task list is stored under
pub const DEFAULT_KEY: &str = "todos";

/// Suffix of the key a malformed value is moved aside to
pub const CORRUPT_SUFFIX: &str = "corrupt";

/// Errors from writing the task list
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How the initial load went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing stored yet
    Missing,
    /// Stored list decoded
    Loaded { count: usize, dropped: usize },
    /// Store could not be read
    Unavailable(String),
    /// Stored value could not be decoded
    Corrupt(String),
}

impl LoadStatus {
    /// Check if the load fell back to an empty list because of a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Corrupt(_))
    }
}

/// Encode tasks into the stored layout
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Decode the stored layout into tasks
///
/// Entries with empty text are dropped and duplicate IDs keep their first
/// occurrence, so decoded lists always satisfy the editor's invariants.
/// Returns the tasks and the number of entries dropped.
pub fn decode_tasks(raw: &str) -> Result<(Vec<Task>, usize), serde_json::Error> {
    let decoded: Vec<Task> = serde_json::from_str(raw)?;
    let total = decoded.len();

    let mut seen = HashSet::new();
    let tasks: Vec<Task> = decoded
        .into_iter()
        .filter_map(|mut task| {
            let trimmed = task.text.trim();
            if trimmed.is_empty() || !seen.insert(task.id.clone()) {
                return None;
            }
            if trimmed.len() != task.text.len() {
                task.text = trimmed.to_string();
            }
            Some(task)
        })
        .collect();

    let dropped = total - tasks.len();
    Ok((tasks, dropped))
}

/// Reads and writes the task list under one key of a store
pub struct TaskRepository {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for TaskRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRepository").field("key", &self.key).finish_non_exhaustive()
    }
}

impl TaskRepository {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    /// Key the list is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored list, falling back to an empty list on any failure
    ///
    /// A malformed value is copied to `{key}.corrupt` (best effort) so the
    /// next write does not silently destroy it.
    pub fn load(&mut self) -> (Vec<Task>, LoadStatus) {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "TaskRepository::load: nothing stored");
                return (Vec::new(), LoadStatus::Missing);
            }
            Err(StoreError::InvalidData { bytes, .. }) => {
                warn!(key = %self.key, bytes = bytes.len(), "Stored tasks are not UTF-8, starting empty");
                self.preserve_corrupt(&bytes);
                return (Vec::new(), LoadStatus::Corrupt("stored value is not valid UTF-8".to_string()));
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Task store unavailable, starting empty");
                return (Vec::new(), LoadStatus::Unavailable(e.to_string()));
            }
        };

        match decode_tasks(&raw) {
            Ok((tasks, dropped)) => {
                if dropped > 0 {
                    warn!(key = %self.key, dropped, "Dropped invalid stored tasks");
                }
                info!(key = %self.key, count = tasks.len(), "Loaded tasks");
                let count = tasks.len();
                (tasks, LoadStatus::Loaded { count, dropped })
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored tasks are malformed, starting empty");
                self.preserve_corrupt(raw.as_bytes());
                (Vec::new(), LoadStatus::Corrupt(e.to_string()))
            }
        }
    }

    fn preserve_corrupt(&mut self, raw: &[u8]) {
        let backup_key = format!("{}.{}", self.key, CORRUPT_SUFFIX);
        match self.store.set_bytes(&backup_key, raw) {
            Ok(()) => info!(%backup_key, "Preserved malformed task data"),
            Err(e) => warn!(%backup_key, error = %e, "Failed to preserve malformed task data"),
        }
    }

    /// Write the full list
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), PersistError> {
        let encoded = encode_tasks(tasks)?;
        self.store.set(&self.key, &encoded)?;
        debug!(key = %self.key, count = tasks.len(), bytes = encoded.len(), "TaskRepository::save: written");
        Ok(())
    }
}
