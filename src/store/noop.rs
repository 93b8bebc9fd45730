//! No-op store adapter
//!
//! Always misses and always succeeds. Used when persisted query caching is
//! disabled: hash-only requests get `PersistedQueryNotFound` and clients fall
//! back to sending full query text.

use async_trait::async_trait;

use super::{QueryStore, StoredValue};
use crate::error::StoreResult;

/// Store that never caches anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

impl NoOpStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<D> QueryStore<D> for NoOpStore
where
    D: Send + Sync + 'static,
{
    async fn fetch(&self, _key: &str) -> StoreResult<Option<StoredValue<D>>> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _value: StoredValue<D>) -> StoreResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
