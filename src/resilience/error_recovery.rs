//! # Store Error Recovery
//!
//! Every store call made during resolution goes through [`RecoveringStore`].
//! A backend failure is handed to the configured [`ErrorHandler`] exactly
//! once and then treated as "the call had no effect": a failed fetch is a
//! miss, a failed save or delete is a no-op. An unavailable cache therefore
//! degrades every persisted query lookup to `PersistedQueryNotFound` instead
//! of failing the request.

use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::error::StoreError;
use crate::store::{QueryStore, StoredValue};

/// Receives store backend failures
///
/// Handlers must not panic; a panicking handler takes the request down with it.
pub trait ErrorHandler: Send + Sync {
    fn call(&self, error: &StoreError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&StoreError) + Send + Sync,
{
    fn call(&self, error: &StoreError) {
        self(error)
    }
}

/// Logs the failure and carries on
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn call(&self, error: &StoreError) {
        warn!(error = %error, "Persisted query store failure recovered");
    }
}

/// Ignores the failure entirely
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentErrorHandler;

impl ErrorHandler for SilentErrorHandler {
    fn call(&self, _error: &StoreError) {}
}

/// Store paired with the handler that absorbs its failures
pub struct RecoveringStore<D> {
    store: Arc<dyn QueryStore<D>>,
    handler: Arc<dyn ErrorHandler>,
}

impl<D> Clone for RecoveringStore<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<D> std::fmt::Debug for RecoveringStore<D>
where
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveringStore")
            .field("provider", &self.store.provider_name())
            .finish()
    }
}

impl<D> RecoveringStore<D>
where
    D: Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn QueryStore<D>>, handler: Arc<dyn ErrorHandler>) -> Self {
        Self { store, handler }
    }

    pub fn store(&self) -> &Arc<dyn QueryStore<D>> {
        &self.store
    }

    pub fn handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.handler
    }

    pub fn requires_pre_serialization(&self) -> bool {
        self.store.requires_pre_serialization()
    }

    /// Fetch, with any backend failure reported and turned into a miss
    pub async fn fetch(&self, key: &str) -> Option<StoredValue<D>> {
        let start = Instant::now();
        match self.store.fetch(key).await {
            Ok(value) => {
                crate::logging::log_store_operation(
                    "fetch",
                    self.store.provider_name(),
                    key,
                    if value.is_some() { "hit" } else { "miss" },
                    start.elapsed(),
                );
                value
            }
            Err(error) => {
                self.recover("fetch", key, &error);
                None
            }
        }
    }

    /// Save, with any backend failure reported and swallowed
    pub async fn save(&self, key: &str, value: StoredValue<D>) {
        let start = Instant::now();
        match self.store.save(key, value).await {
            Ok(()) => crate::logging::log_store_operation(
                "save",
                self.store.provider_name(),
                key,
                "ok",
                start.elapsed(),
            ),
            Err(error) => self.recover("save", key, &error),
        }
    }

    /// Delete, with any backend failure reported and swallowed
    pub async fn delete(&self, key: &str) {
        let start = Instant::now();
        match self.store.delete(key).await {
            Ok(()) => crate::logging::log_store_operation(
                "delete",
                self.store.provider_name(),
                key,
                "ok",
                start.elapsed(),
            ),
            Err(error) => self.recover("delete", key, &error),
        }
    }

    /// Report a failure that happened outside the backend call itself
    /// (e.g. encoding a document before a save)
    pub fn report(&self, operation: &str, key: &str, error: &StoreError) {
        self.recover(operation, key, error);
    }

    fn recover(&self, operation: &str, key: &str, error: &StoreError) {
        crate::logging::log_store_failure(operation, self.store.provider_name(), key, error);
        self.handler.call(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStore;

    #[async_trait]
    impl QueryStore<String> for BrokenStore {
        async fn fetch(&self, _key: &str) -> StoreResult<Option<StoredValue<String>>> {
            Err(StoreError::Connection("refused".to_string()))
        }

        async fn save(&self, _key: &str, _value: StoredValue<String>) -> StoreResult<()> {
            Err(StoreError::Timeout("save".to_string()))
        }

        async fn delete(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Backend("delete".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    fn counting_handler() -> (Arc<AtomicUsize>, Arc<dyn ErrorHandler>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handler: Arc<dyn ErrorHandler> = Arc::new(move |_error: &StoreError| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[tokio::test]
    async fn test_each_failure_reaches_handler_once() {
        let (count, handler) = counting_handler();
        let store = RecoveringStore::new(Arc::new(BrokenStore), handler);

        assert!(store.fetch("k").await.is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        store.save("k", StoredValue::Text("v".to_string())).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        store.delete("k").await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_healthy_store_never_calls_handler() {
        let (count, handler) = counting_handler();
        let store: RecoveringStore<String> =
            RecoveringStore::new(Arc::new(MemoryStore::<String>::new()), handler);

        store.save("k", StoredValue::Text("v".to_string())).await;
        assert_eq!(store.fetch("k").await, Some(StoredValue::Text("v".to_string())));
        store.delete("k").await;
        assert!(store.fetch("k").await.is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_builtin_handlers_do_not_panic() {
        let error = StoreError::Backend("down".to_string());
        DefaultErrorHandler.call(&error);
        SilentErrorHandler.call(&error);
    }
}
