//! Circuit breaker protected store adapter
//!
//! Wraps any [`QueryStore`] with a [`CircuitBreaker`] to stop paying timeout
//! penalties while a networked backend is down. When the circuit is open:
//!
//! - `fetch()` returns `Ok(None)` - cache miss
//! - `save()` / `delete()` return `Ok(())` - no-op
//!
//! Failures observed while the circuit is closed or half-open are still
//! returned to the caller, so the error handler sees them.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::{QueryStore, StoredValue};
use crate::error::StoreResult;
use crate::resilience::{CircuitBreaker, CircuitState};

pub struct CircuitBreakerStore<D> {
    inner: Arc<dyn QueryStore<D>>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl<D> std::fmt::Debug for CircuitBreakerStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerStore")
            .field("provider", &self.inner.provider_name())
            .field("circuit_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl<D> CircuitBreakerStore<D> {
    pub fn new(inner: Arc<dyn QueryStore<D>>, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            inner,
            circuit_breaker,
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.circuit_breaker
    }

    fn record<T>(&self, result: &StoreResult<T>, start: Instant) {
        match result {
            Ok(_) => self.circuit_breaker.record_success(start.elapsed()),
            Err(_) => self.circuit_breaker.record_failure(start.elapsed()),
        }
    }
}

#[async_trait]
impl<D> QueryStore<D> for CircuitBreakerStore<D>
where
    D: Send + Sync + 'static,
{
    async fn fetch(&self, key: &str) -> StoreResult<Option<StoredValue<D>>> {
        if !self.circuit_breaker.should_allow() {
            debug!(key = key, "Store circuit open, returning miss");
            return Ok(None);
        }

        let start = Instant::now();
        let result = self.inner.fetch(key).await;
        self.record(&result, start);
        result
    }

    async fn save(&self, key: &str, value: StoredValue<D>) -> StoreResult<()> {
        if !self.circuit_breaker.should_allow() {
            debug!(key = key, "Store circuit open, skipping save");
            return Ok(());
        }

        let start = Instant::now();
        let result = self.inner.save(key, value).await;
        self.record(&result, start);
        result
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        if !self.circuit_breaker.should_allow() {
            debug!(key = key, "Store circuit open, skipping delete");
            return Ok(());
        }

        let start = Instant::now();
        let result = self.inner.delete(key).await;
        self.record(&result, start);
        result
    }

    fn requires_pre_serialization(&self) -> bool {
        self.inner.requires_pre_serialization()
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
