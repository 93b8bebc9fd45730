//! # Store Adapters
//!
//! Pluggable key/value persistence for cached queries and documents.
//!
//! ## Architecture
//!
//! ```text
//! QueryStore<D> (trait)
//!   ├── MemoryStore<D>          <- DashMap reference store
//!   ├── NoOpStore               <- Always-miss, always-succeed fallback
//!   └── CircuitBreakerStore<D>  <- Fail-fast wrapper around any store
//! ```
//!
//! Production backends (Redis, Memcached, ...) live outside this crate and
//! implement [`QueryStore`] themselves. Stores that can only hold bytes
//! declare it through [`QueryStore::requires_pre_serialization`], and the
//! document strategy encodes before saving.

pub mod circuit_breaker;
pub mod memory;
pub mod noop;

pub use circuit_breaker::CircuitBreakerStore;
pub use memory::MemoryStore;
pub use noop::NoOpStore;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Value persisted under a cache key
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue<D> {
    /// Raw query text
    Text(String),
    /// Pre-serialized payload
    Bytes(Vec<u8>),
    /// Parsed document held as-is
    Document(D),
}

impl<D> StoredValue<D> {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "text",
            StoredValue::Bytes(_) => "bytes",
            StoredValue::Document(_) => "document",
        }
    }
}

/// Uniform persistence contract implemented by every store backend
///
/// Every call may fail; callers route failures through
/// [`crate::resilience::RecoveringStore`] rather than propagating them.
#[async_trait]
pub trait QueryStore<D>: Send + Sync {
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` on miss
    async fn fetch(&self, key: &str) -> StoreResult<Option<StoredValue<D>>>;

    async fn save(&self, key: &str, value: StoredValue<D>) -> StoreResult<()>;

    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Whether documents must be encoded to bytes before `save`
    fn requires_pre_serialization(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &'static str;
}
