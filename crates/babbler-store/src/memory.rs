//! In-memory implementation of the ChainStore trait.
//!
//! Primarily for testing. Same semantics as SQLite but keeps everything in
//! memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use babbler_core::TransitionRecord;

use crate::error::Result;
use crate::legacy::LegacySnapshot;
use crate::traits::ChainStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    chain: HashMap<String, TransitionRecord>,
    snapshot_imported: bool,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                chain: HashMap::new(),
                snapshot_imported: false,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<TransitionRecord> {
        let inner = self.inner.read().unwrap();
        Ok(inner.chain.get(key).cloned().unwrap_or_default())
    }

    async fn put(&self, key: &str, record: &TransitionRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.chain.insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn record_count(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.chain.len() as u64)
    }

    async fn snapshot_imported(&self) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner.snapshot_imported)
    }

    async fn import_snapshot(&self, snapshot: &LegacySnapshot) -> Result<u64> {
        let mut inner = self.inner.write().unwrap();

        let mut written = 0u64;
        for (key, successors) in &snapshot.chain {
            inner
                .chain
                .insert(key.clone(), TransitionRecord::from_words(successors));
            written += 1;
        }
        inner.snapshot_imported = true;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_empty());

        let record = TransitionRecord::from_words(["fox", "dog"]);
        store.put("the quick", &record).await.unwrap();

        assert_eq!(store.get("the quick").await.unwrap(), record);
        assert_eq!(store.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_import() {
        let store = MemoryStore::new();
        let mut chain = HashMap::new();
        chain.insert(
            "the quick".to_string(),
            vec!["fox".to_string(), "fox".to_string(), "dog".to_string()],
        );

        let written = store
            .import_snapshot(&LegacySnapshot { chain })
            .await
            .unwrap();

        assert_eq!(written, 1);
        assert!(store.snapshot_imported().await.unwrap());
        assert_eq!(
            store.get("the quick").await.unwrap().words(),
            ["fox", "dog"]
        );
    }
}
