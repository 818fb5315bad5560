//! In-process store with the same semantics as `FileStore`

use std::collections::BTreeMap;

use crate::{KeyValueStore, StoreError, validate_key};

/// Volatile store; contents are lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values larger than `quota_bytes`
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        match self.entries.get(key) {
            Some(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|e| StoreError::InvalidData {
                    key: key.to_string(),
                    bytes: e.into_bytes(),
                }),
            None => Ok(None),
        }
    }

    fn set_bytes(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        if let Some(quota) = self.quota_bytes
            && value.len() > quota
        {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                quota,
            });
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        validate_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic_ops() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        assert!(store.remove("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::new().with_quota(3);
        assert!(store.set("k", "abc").is_ok());
        assert!(store.set("k", "abcd").unwrap_err().is_quota());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_memory_store_non_utf8_is_invalid_data() {
        let mut store = MemoryStore::new();
        store.set_bytes("k", &[0xff]).unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::InvalidData { .. })));
    }
}
