//! # Resolution Strategies
//!
//! Two interchangeable implementations of [`PersistedQueryResolver`]:
//!
//! - [`TextResolver`] caches and returns the raw query text
//! - [`DocumentResolver`] caches and returns the parsed document, encoding it
//!   to bytes for stores that declare the pre-serialization capability
//!
//! Both follow the same protocol for an item carrying
//! `persistedQuery.sha256Hash`:
//!
//! ```text
//! no hash ─────────────────────────────▶ item unchanged
//! hash + text ─▶ verify ─┬─ mismatch ──▶ HashMismatch (store untouched)
//!                        └─ match ─────▶ save (best effort) ─▶ item
//! hash only ───▶ fetch ──┬─ hit ───────▶ item with query/document
//!                        └─ miss ──────▶ NotFound
//! ```
//!
//! Store failures never surface here; they are absorbed by
//! [`RecoveringStore`] and look like misses.

pub mod document;
pub mod text;

pub use document::DocumentResolver;
pub use text::TextResolver;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ParseFailurePolicy;
use crate::document::{DocumentCodec, DocumentParser};
use crate::error::ResolutionResult;
use crate::hashing::QueryHasher;
use crate::protocol::QueryItem;
use crate::resilience::RecoveringStore;

/// A persisted query resolution strategy
#[async_trait]
pub trait PersistedQueryResolver<D>: Send + Sync {
    /// Canonical strategy name
    fn name(&self) -> &'static str;

    /// Resolve one item against its (already detached) extensions
    ///
    /// Returns the item, possibly with `query` or `document` filled in, or
    /// the per-item error that replaces its execution result.
    async fn resolve(&self, item: QueryItem<D>, extensions: &Value)
        -> ResolutionResult<QueryItem<D>>;
}

/// Injected dependencies shared by every strategy
///
/// Treated as immutable, process-lifetime configuration.
pub struct ResolverContext<D> {
    pub store: RecoveringStore<D>,
    pub hasher: Arc<dyn QueryHasher>,
    pub parser: Arc<dyn DocumentParser<D>>,
    pub codec: Arc<dyn DocumentCodec<D>>,
    pub parse_failure_policy: ParseFailurePolicy,
}

impl<D> Clone for ResolverContext<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hasher: Arc::clone(&self.hasher),
            parser: Arc::clone(&self.parser),
            codec: Arc::clone(&self.codec),
            parse_failure_policy: self.parse_failure_policy,
        }
    }
}

impl<D> std::fmt::Debug for ResolverContext<D>
where
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("store", &self.store)
            .field("codec_format_version", &self.codec.format_version())
            .field("parse_failure_policy", &self.parse_failure_policy)
            .finish()
    }
}
