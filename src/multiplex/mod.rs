//! # Multiplex Resolution
//!
//! Applies the configured strategy to every query of a batch, answers the
//! items that failed resolution directly, and hands the rest to the host's
//! executor in one call.
//!
//! ## Flow
//!
//! ```text
//! items ──▶ resolve each (bounded concurrency, index-addressed slots)
//!             ├─ resolved ──▶ pending ─┐
//!             └─ error ─────▶ results[i] = error payload
//!                                      ▼
//!           executor.execute_batch(pending in original order)   (exactly once)
//!                                      ▼
//!           results[i] = execution result for each pending position
//! ```
//!
//! The response always has one entry per input item, in input order, no
//! matter which subset reached the executor or in which order resolutions
//! completed.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::defaults;
use crate::error::{MultiplexError, ResolutionError};
use crate::protocol::{persisted_query_hash, QueryItem};
use crate::resolver::PersistedQueryResolver;

/// Options forwarded untouched to the executor (context, max complexity, ...)
pub type ExecutionOptions = Map<String, Value>;

/// The host's batch executor
///
/// Must return exactly one result per input item, in input order.
#[async_trait]
pub trait MultiplexExecutor<D>: Send + Sync {
    async fn execute_batch(
        &self,
        items: Vec<QueryItem<D>>,
        options: &ExecutionOptions,
    ) -> Result<Vec<Value>, MultiplexError>;
}

/// Per-position state while a batch is being resolved
enum Slot<D> {
    Empty,
    Pending(QueryItem<D>),
    Answered(Value),
}

/// Resolves persisted queries across a batch and executes what remains
pub struct MultiplexResolver<D> {
    resolver: Arc<dyn PersistedQueryResolver<D>>,
    executor: Arc<dyn MultiplexExecutor<D>>,
    max_concurrency: usize,
}

impl<D> Clone for MultiplexResolver<D> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            executor: Arc::clone(&self.executor),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl<D> std::fmt::Debug for MultiplexResolver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiplexResolver")
            .field("resolver", &self.resolver.name())
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

impl<D> MultiplexResolver<D>
where
    D: Send + Sync + 'static,
{
    pub fn new(
        resolver: Arc<dyn PersistedQueryResolver<D>>,
        executor: Arc<dyn MultiplexExecutor<D>>,
    ) -> Self {
        Self {
            resolver,
            executor,
            max_concurrency: defaults::MAX_CONCURRENT_RESOLUTIONS,
        }
    }

    /// Bound the number of items resolving at once (minimum 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn resolver(&self) -> &Arc<dyn PersistedQueryResolver<D>> {
        &self.resolver
    }

    /// Resolve and execute a batch, returning one result per input item
    pub async fn resolve(
        &self,
        items: Vec<QueryItem<D>>,
        options: &ExecutionOptions,
    ) -> Result<Vec<Value>, MultiplexError> {
        let batch_size = items.len();
        let mut slots = self.resolve_persisted_queries(items).await;

        let mut positions = Vec::with_capacity(batch_size);
        let mut pending = Vec::with_capacity(batch_size);
        for (position, slot) in slots.iter_mut().enumerate() {
            match std::mem::replace(slot, Slot::Empty) {
                Slot::Pending(item) => {
                    positions.push(position);
                    pending.push(item);
                }
                other => *slot = other,
            }
        }

        debug!(
            batch_size = batch_size,
            executing = pending.len(),
            answered = batch_size - pending.len(),
            "Executing resolved persisted queries"
        );

        let executed = self.executor.execute_batch(pending, options).await?;
        if executed.len() != positions.len() {
            return Err(MultiplexError::ResultCountMismatch {
                expected: positions.len(),
                actual: executed.len(),
            });
        }

        for (position, result) in positions.into_iter().zip(executed) {
            slots[position] = Slot::Answered(result);
        }

        let results = collect_answers(slots);

        info!(
            batch_size = batch_size,
            resolver = self.resolver.name(),
            "Multiplex batch completed"
        );
        Ok(results)
    }

    /// Resolve every item; slots are addressed by input position, so
    /// completion order does not matter
    async fn resolve_persisted_queries(&self, items: Vec<QueryItem<D>>) -> Vec<Slot<D>> {
        let mut slots: Vec<Slot<D>> = Vec::with_capacity(items.len());
        slots.resize_with(items.len(), || Slot::Empty);

        let resolver = self.resolver.as_ref();
        let resolved: Vec<(usize, Slot<D>)> = stream::iter(items.into_iter().enumerate())
            .map(|(position, item)| async move {
                (position, Self::resolve_item(resolver, position, item).await)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for (position, slot) in resolved {
            slots[position] = slot;
        }

        slots
    }

    async fn resolve_item(
        resolver: &dyn PersistedQueryResolver<D>,
        position: usize,
        mut item: QueryItem<D>,
    ) -> Slot<D> {
        let Some(extensions) = item.extensions.take() else {
            return Slot::Pending(item);
        };
        let hash = persisted_query_hash(&extensions);

        match resolver.resolve(item, &extensions).await {
            Ok(resolved) => {
                crate::logging::log_resolution(resolver.name(), position, hash, "resolved", None);
                Slot::Pending(resolved)
            }
            Err(error) => {
                let outcome = match &error {
                    ResolutionError::NotFound => "not_found",
                    ResolutionError::HashMismatch => "hash_mismatch",
                    ResolutionError::Parse(_) => "parse_error",
                };
                crate::logging::log_resolution(
                    resolver.name(),
                    position,
                    hash,
                    outcome,
                    Some(&error.to_string()),
                );
                Slot::Answered(error.to_error_payload())
            }
        }
    }
}

/// Unwrap answered slots in position order
///
/// Every position is answered once the executor's results are spliced back.
/// An unanswered slot is a bug in the splice and trips a debug assertion;
/// release builds answer it with `null`.
fn collect_answers<D>(slots: Vec<Slot<D>>) -> Vec<Value> {
    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| match slot {
            Slot::Answered(value) => value,
            Slot::Empty | Slot::Pending(_) => {
                debug_assert!(false, "multiplex slot {position} was never answered");
                Value::Null
            }
        })
        .collect()
}
