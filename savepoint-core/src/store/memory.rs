use std::collections::HashMap;

use super::{check_quota, LocalStore};
use crate::types::PersistError;

/// In-process bounded store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    quota: usize,
}

impl MemoryStore {
    pub fn new(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota,
        }
    }

    fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl LocalStore for MemoryStore {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistError> {
        let existing = self.entries.get(key).map_or(0, |v| key.len() + v.len());
        check_quota(self.quota, self.used() - existing, key, value)?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }

    fn usage(&mut self) -> Result<usize, PersistError> {
        Ok(self.used())
    }

    fn quota(&self) -> usize {
        self.quota
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let mut store = MemoryStore::new(64);
        store.put("k", b"value").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"value"[..]));
        assert_eq!(store.usage().unwrap(), 6);
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.usage().unwrap(), 0);
    }

    #[test]
    fn overwrite_reuses_the_old_entry_space() {
        let mut store = MemoryStore::new(8);
        store.put("k", b"1234567").unwrap();
        store.put("k", b"7654321").unwrap();
        assert_eq!(store.usage().unwrap(), 8);
    }

    #[test]
    fn over_quota_put_leaves_store_untouched() {
        let mut store = MemoryStore::new(8);
        store.put("a", b"123").unwrap();
        let err = store.put("b", b"123456").unwrap_err();
        assert!(matches!(err, PersistError::CapacityExceeded { needed: 7, available: 4 }));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.usage().unwrap(), 4);
    }
}
