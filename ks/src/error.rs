//! KeyStore error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key '{0}': keys use [A-Za-z0-9._-] and must not start with '.'")]
    InvalidKey(String),

    #[error("Value for '{key}' is {size} bytes, quota is {quota} bytes")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    /// Stored bytes are not UTF-8; the raw value is returned so callers can keep it
    #[error("Value for '{key}' is not valid UTF-8 ({} bytes)", .bytes.len())]
    InvalidData { key: String, bytes: Vec<u8> },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a quota rejection
    pub fn is_quota(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}
