//! Store double that records every call and can be told to fail

use async_trait::async_trait;
use parking_lot::Mutex;
use persisted_queries::error::{StoreError, StoreResult};
use persisted_queries::store::{MemoryStore, QueryStore, StoredValue};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch(String),
    Save(String),
    Delete(String),
}

/// Memory-backed store that logs calls and injects failures per operation
#[derive(Debug)]
pub struct RecordingStore<D> {
    inner: MemoryStore<D>,
    calls: Mutex<Vec<StoreCall>>,
    fail_fetch: AtomicBool,
    fail_save: AtomicBool,
    fail_delete: AtomicBool,
}

impl<D> RecordingStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::wrapping(MemoryStore::new())
    }

    pub fn pre_serialized() -> Self {
        Self::wrapping(MemoryStore::pre_serialized())
    }

    fn wrapping(inner: MemoryStore<D>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn saves(&self) -> usize {
        self.count(|call| matches!(call, StoreCall::Save(_)))
    }

    pub fn deletes(&self) -> usize {
        self.count(|call| matches!(call, StoreCall::Delete(_)))
    }

    pub fn fetches(&self) -> usize {
        self.count(|call| matches!(call, StoreCall::Fetch(_)))
    }

    fn count(&self, predicate: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Inspect the backing entry without recording a call
    pub async fn peek(&self, key: &str) -> Option<StoredValue<D>> {
        self.inner.fetch(key).await.ok().flatten()
    }

    /// Write directly to the backing map without recording a call
    pub async fn seed(&self, key: &str, value: StoredValue<D>) {
        let _ = self.inner.save(key, value).await;
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl<D> QueryStore<D> for RecordingStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, key: &str) -> StoreResult<Option<StoredValue<D>>> {
        self.calls.lock().push(StoreCall::Fetch(key.to_string()));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("fetch refused".to_string()));
        }
        self.inner.fetch(key).await
    }

    async fn save(&self, key: &str, value: StoredValue<D>) -> StoreResult<()> {
        self.calls.lock().push(StoreCall::Save(key.to_string()));
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout("save timed out".to_string()));
        }
        self.inner.save(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.calls.lock().push(StoreCall::Delete(key.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("delete failed".to_string()));
        }
        self.inner.delete(key).await
    }

    fn requires_pre_serialization(&self) -> bool {
        self.inner.requires_pre_serialization()
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
