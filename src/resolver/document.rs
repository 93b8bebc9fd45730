//! Parsed document strategy
//!
//! Caches the parsed document so that hash-only requests skip parsing. For
//! stores that declare the pre-serialization capability the document is
//! encoded with the injected [`DocumentCodec`]; a payload that no longer
//! decodes is deleted and treated as a cache miss.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{PersistedQueryResolver, ResolverContext};
use crate::config::ParseFailurePolicy;
use crate::constants::{names, namespaces};
use crate::document::{DocumentCodec, DocumentParser};
use crate::error::{ResolutionError, ResolutionResult, StoreError};
use crate::hashing::{self, QueryHasher};
use crate::protocol::{persisted_query_hash, CacheKey, QueryItem};
use crate::resilience::RecoveringStore;
use crate::store::StoredValue;

/// Caches parsed documents under `document-<codec format version>:<hash>`
pub struct DocumentResolver<D> {
    store: RecoveringStore<D>,
    hasher: Arc<dyn QueryHasher>,
    parser: Arc<dyn DocumentParser<D>>,
    codec: Arc<dyn DocumentCodec<D>>,
    parse_failure_policy: ParseFailurePolicy,
    namespace: String,
}

impl<D> std::fmt::Debug for DocumentResolver<D>
where
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResolver")
            .field("store", &self.store)
            .field("namespace", &self.namespace)
            .field("parse_failure_policy", &self.parse_failure_policy)
            .finish()
    }
}

impl<D> DocumentResolver<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub fn from_context(context: &ResolverContext<D>) -> Self {
        let namespace = format!(
            "{}-{}",
            namespaces::DOCUMENT_PREFIX,
            context.codec.format_version()
        );

        Self {
            store: context.store.clone(),
            hasher: Arc::clone(&context.hasher),
            parser: Arc::clone(&context.parser),
            codec: Arc::clone(&context.codec),
            parse_failure_policy: context.parse_failure_policy,
            namespace,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn cache_key(&self, hash: &str) -> CacheKey {
        CacheKey::new(&self.namespace, hash)
    }

    async fn persist(&self, key: &CacheKey, document: &D) {
        if !self.store.requires_pre_serialization() {
            self.store
                .save(key.as_str(), StoredValue::Document(document.clone()))
                .await;
            return;
        }

        match self.codec.encode(document) {
            Ok(bytes) => self.store.save(key.as_str(), StoredValue::Bytes(bytes)).await,
            Err(error) => self
                .store
                .report("encode", key.as_str(), &StoreError::from(error)),
        }
    }

    async fn fetch_document(&self, key: &CacheKey) -> Option<D> {
        let payload = match self.store.fetch(key.as_str()).await? {
            StoredValue::Document(document) => return Some(document),
            StoredValue::Bytes(bytes) => bytes,
            StoredValue::Text(text) => text.into_bytes(),
        };

        match self.codec.decode(&payload) {
            Ok(document) => Some(document),
            Err(error) => {
                // Corrupt or written by another codec generation: drop it and miss
                warn!(key = %key, error = %error, "Dropping undecodable persisted document");
                self.store.delete(key.as_str()).await;
                None
            }
        }
    }
}

#[async_trait]
impl<D> PersistedQueryResolver<D> for DocumentResolver<D>
where
    D: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        names::DOCUMENT_RESOLVER
    }

    async fn resolve(
        &self,
        mut item: QueryItem<D>,
        extensions: &Value,
    ) -> ResolutionResult<QueryItem<D>> {
        let Some(hash) = persisted_query_hash(extensions) else {
            return Ok(item);
        };
        let key = self.cache_key(hash);

        let Some(text) = item.query.take() else {
            let document = self
                .fetch_document(&key)
                .await
                .ok_or(ResolutionError::NotFound)?;
            item.document = Some(document);
            return Ok(item);
        };

        hashing::verify(self.hasher.as_ref(), &text, hash)?;

        match self.parser.parse(&text) {
            Ok(document) => {
                self.persist(&key, &document).await;
                debug!(key = %key, "Persisted query document saved");
                item.document = Some(document);
                Ok(item)
            }
            Err(parse_error) => match self.parse_failure_policy {
                ParseFailurePolicy::Reject => Err(ResolutionError::Parse(parse_error)),
                ParseFailurePolicy::Defer => {
                    debug!(
                        key = %key,
                        error = %parse_error,
                        "Query text did not parse, leaving it for the executor"
                    );
                    item.query = Some(text);
                    item.document = None;
                    Ok(item)
                }
            },
        }
    }
}
