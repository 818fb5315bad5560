//! Core KeyStore implementation

use fs2::FileExt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::StoreError;

/// Lock file guarding writers within one store directory
const LOCK_FILE: &str = ".lock";

/// String-keyed, string-valued durable storage
///
/// Implementations must make `set` all-or-nothing: after an error the
/// previous value (if any) is still readable.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store raw bytes under `key`, replacing any previous value
    fn set_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_bytes(key, value.as_bytes())
    }

    /// Remove `key`, returning whether it existed
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;

    /// List stored keys in sorted order
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Check that a key is safe to map onto a file name
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Store backed by one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Base path for storage
    base_path: PathBuf,
    /// Maximum size of a single value in bytes
    quota_bytes: Option<usize>,
}

impl FileStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| StoreError::io(&base_path, e))?;
        debug!(?base_path, "Opened key store");
        Ok(Self {
            base_path,
            quota_bytes: None,
        })
    }

    /// Reject values larger than `quota_bytes`
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Directory holding the stored values
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", key, crate::VALUE_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!(".{}.{}.{}.tmp", key, crate::VALUE_EXTENSION, std::process::id()))
    }

    fn check_quota(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes
            && value.len() > quota
        {
            debug!(key, size = value.len(), quota, "FileStore: quota exceeded");
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                quota,
            });
        }
        Ok(())
    }

    fn write_atomic(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let lock_path = self.base_path.join(LOCK_FILE);
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        FileExt::lock_exclusive(&lock).map_err(|e| StoreError::io(&lock_path, e))?;

        let temp_path = self.temp_path(key);
        let result = (|| {
            let mut file = fs::File::create(&temp_path).map_err(|e| StoreError::io(&temp_path, e))?;
            file.write_all(value)
                .map_err(|e| StoreError::io(&temp_path, e))?;
            file.sync_all().map_err(|e| StoreError::io(&temp_path, e))?;
            let target = self.value_path(key);
            fs::rename(&temp_path, &target).map_err(|e| StoreError::io(&target, e))
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        let _ = FileExt::unlock(&lock);
        result
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let path = self.value_path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "FileStore::get: hit");
                String::from_utf8(bytes)
                    .map(Some)
                    .map_err(|e| StoreError::InvalidData {
                        key: key.to_string(),
                        bytes: e.into_bytes(),
                    })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "FileStore::get: miss");
                Ok(None)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        self.check_quota(key, value)?;
        self.write_atomic(key, value)?;
        debug!(key, bytes = value.len(), "FileStore::set: written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        let path = self.value_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(key, "Removed key");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let entries = fs::read_dir(&self.base_path).map_err(|e| StoreError::io(&self.base_path, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.base_path, e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != crate::VALUE_EXTENSION).unwrap_or(true) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_key(stem).is_ok()
            {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }
}
