//! Raw query text strategy

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{PersistedQueryResolver, ResolverContext};
use crate::constants::{names, namespaces};
use crate::error::{ResolutionError, ResolutionResult};
use crate::hashing::{self, QueryHasher};
use crate::protocol::{persisted_query_hash, CacheKey, QueryItem};
use crate::resilience::RecoveringStore;
use crate::store::StoredValue;

/// Caches the query text itself under `query:<hash>`
pub struct TextResolver<D> {
    store: RecoveringStore<D>,
    hasher: Arc<dyn QueryHasher>,
}

impl<D> std::fmt::Debug for TextResolver<D>
where
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextResolver")
            .field("store", &self.store)
            .finish()
    }
}

impl<D> TextResolver<D>
where
    D: Send + Sync + 'static,
{
    pub fn new(store: RecoveringStore<D>, hasher: Arc<dyn QueryHasher>) -> Self {
        Self { store, hasher }
    }

    pub fn from_context(context: &ResolverContext<D>) -> Self {
        Self::new(context.store.clone(), Arc::clone(&context.hasher))
    }

    pub fn cache_key(hash: &str) -> CacheKey {
        CacheKey::new(namespaces::TEXT, hash)
    }

    async fn persist(&self, key: &CacheKey, text: &str) {
        let value = if self.store.requires_pre_serialization() {
            StoredValue::Bytes(text.as_bytes().to_vec())
        } else {
            StoredValue::Text(text.to_string())
        };
        self.store.save(key.as_str(), value).await;
    }

    async fn fetch_text(&self, key: &CacheKey) -> Option<String> {
        match self.store.fetch(key.as_str()).await? {
            StoredValue::Text(text) => Some(text),
            StoredValue::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(error) => {
                    self.purge(key, &error.to_string()).await;
                    None
                }
            },
            StoredValue::Document(_) => {
                self.purge(key, "document stored under a text key").await;
                None
            }
        }
    }

    async fn purge(&self, key: &CacheKey, reason: &str) {
        warn!(key = %key, reason = %reason, "Dropping unreadable persisted query");
        self.store.delete(key.as_str()).await;
    }
}

#[async_trait]
impl<D> PersistedQueryResolver<D> for TextResolver<D>
where
    D: Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        names::TEXT_RESOLVER
    }

    async fn resolve(
        &self,
        mut item: QueryItem<D>,
        extensions: &Value,
    ) -> ResolutionResult<QueryItem<D>> {
        let Some(hash) = persisted_query_hash(extensions) else {
            return Ok(item);
        };
        let key = Self::cache_key(hash);

        if let Some(text) = item.query.as_deref() {
            hashing::verify(self.hasher.as_ref(), text, hash)?;
            self.persist(&key, text).await;
            debug!(key = %key, "Persisted query text saved");
            return Ok(item);
        }

        let text = self
            .fetch_text(&key)
            .await
            .ok_or(ResolutionError::NotFound)?;
        item.query = Some(text);
        Ok(item)
    }
}
