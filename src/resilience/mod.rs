//! # Resilience Module
//!
//! Keeps store backend failures away from query execution.
//!
//! ## Architecture
//!
//! - **Error Recovery**: every store call is wrapped by [`RecoveringStore`];
//!   failures go to an [`ErrorHandler`] and the call degrades to a miss/no-op
//! - **Circuit Breakers**: optional fail-fast protection for networked
//!   backends, applied through [`crate::store::CircuitBreakerStore`]
//! - **Configuration**: per-breaker thresholds in [`CircuitBreakerConfig`]
//!
//! ## Usage
//!
//! ```rust
//! use persisted_queries::resilience::{DefaultErrorHandler, RecoveringStore};
//! use persisted_queries::store::{MemoryStore, StoredValue};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store: RecoveringStore<String> = RecoveringStore::new(
//!     Arc::new(MemoryStore::<String>::new()),
//!     Arc::new(DefaultErrorHandler),
//! );
//!
//! store.save("query:abc", StoredValue::Text("{ viewer { id } }".to_string())).await;
//! assert!(store.fetch("query:abc").await.is_some());
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod error_recovery;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerMetrics, CircuitState};
pub use config::CircuitBreakerConfig;
pub use error_recovery::{DefaultErrorHandler, ErrorHandler, RecoveringStore, SilentErrorHandler};
