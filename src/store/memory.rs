//! In-memory store adapter
//!
//! Reference implementation of [`QueryStore`] backed by a `DashMap`. Entries
//! live for the lifetime of the store; there is no eviction.
//!
//! **Important**: This store is NOT distributed. Each process keeps its own
//! entries, so clients may see `PersistedQueryNotFound` when a batch lands on
//! a different instance than the one that cached the query.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{QueryStore, StoredValue};
use crate::error::StoreResult;

/// In-memory query store
#[derive(Debug)]
pub struct MemoryStore<D> {
    entries: DashMap<String, StoredValue<D>>,
    pre_serialize: bool,
}

impl<D> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> MemoryStore<D> {
    /// Store that holds documents as-is
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            pre_serialize: false,
        }
    }

    /// Store that declares the pre-serialization capability, standing in for
    /// byte-oriented backends
    pub fn pre_serialized() -> Self {
        Self {
            entries: DashMap::new(),
            pre_serialize: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl<D> QueryStore<D> for MemoryStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, key: &str) -> StoreResult<Option<StoredValue<D>>> {
        let result = self.entries.get(key).map(|entry| entry.value().clone());

        if result.is_some() {
            debug!(key = key, "Store HIT (memory)");
        } else {
            debug!(key = key, "Store MISS (memory)");
        }

        Ok(result)
    }

    async fn save(&self, key: &str, value: StoredValue<D>) -> StoreResult<()> {
        debug!(key = key, kind = value.kind(), "Store SET (memory)");
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        debug!(key = key, "Store DEL (memory)");
        Ok(())
    }

    fn requires_pre_serialization(&self) -> bool {
        self.pre_serialize
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
