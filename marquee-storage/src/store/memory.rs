//! In-process store backed by a `BTreeMap`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use marquee_core::StoreError;

use super::traits::{KeyValueStore, StoreResult};

/// In-memory key-value store.
///
/// Keys are kept ordered so prefix scans are a single range walk.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }

    fn keys_with_prefix(entries: &BTreeMap<String, Vec<u8>>, prefix: &str) -> Vec<String> {
        entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(key).is_some())
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let keys = Self::keys_with_prefix(&entries, prefix);
        for key in &keys {
            entries.remove(key);
        }
        Ok(keys.len() as u64)
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Self::keys_with_prefix(&entries, prefix))
    }
}
