#![allow(clippy::doc_markdown)] // Allow technical terms like GraphQL, APQ in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Persisted Queries
//!
//! Automatic persisted query (APQ) resolution for GraphQL-style query engines.
//!
//! ## Overview
//!
//! Clients send a SHA-256 hash of their query text instead of the text itself.
//! The server looks the hash up in a cache; on a miss the client resends the
//! full text with the hash, the server verifies the hash, caches the query and
//! executes it. Later requests carry only the hash.
//!
//! ## Architecture
//!
//! - **Strategies**: the text strategy caches raw query text, the document
//!   strategy caches the parsed document so cache hits skip parsing
//! - **Stores**: any key/value backend behind [`store::QueryStore`]; failures
//!   are absorbed by [`resilience::RecoveringStore`] and look like misses
//! - **Multiplex**: a batch of queries is resolved item by item, failed items
//!   are answered directly and the rest execute in one executor call
//!
//! ## Module Organization
//!
//! - [`protocol`] - Query items, extension parsing and cache keys
//! - [`hashing`] - Hash functions and hash verification
//! - [`document`] - Host parser and codec seams
//! - [`store`] - Store adapters
//! - [`resilience`] - Error recovery and circuit breakers
//! - [`resolver`] - Resolution strategies
//! - [`registry`] - Name-based component construction
//! - [`multiplex`] - Batch resolution and execution
//! - [`system_context`] - Wiring of all of the above
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use persisted_queries::config::PersistedQueryConfig;
//! use persisted_queries::document::JsonDocumentCodec;
//! use persisted_queries::error::ParseError;
//! use persisted_queries::system_context::PersistedQueries;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = |text: &str| -> Result<String, ParseError> { Ok(text.trim().to_string()) };
//! let queries: PersistedQueries<String> =
//!     PersistedQueries::builder(Arc::new(parser), Arc::new(JsonDocumentCodec::default()))
//!         .config(PersistedQueryConfig::load()?)
//!         .build()?;
//!
//! println!("Persisted query resolver: {}", queries.resolver().name());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod multiplex;
pub mod protocol;
pub mod registry;
pub mod resilience;
pub mod resolver;
pub mod store;
pub mod system_context;

pub use config::{ParseFailurePolicy, PersistedQueryConfig, StoreConfig};
pub use document::{DocumentCodec, DocumentParser, JsonDocumentCodec};
pub use error::{
    ConfigurationError, MultiplexError, ParseError, PersistedQueryError, ResolutionError, Result,
    StoreError,
};
pub use hashing::{QueryHasher, Sha256Hasher};
pub use multiplex::{ExecutionOptions, MultiplexExecutor, MultiplexResolver};
pub use protocol::{CacheKey, QueryItem};
pub use resilience::{DefaultErrorHandler, ErrorHandler, RecoveringStore, SilentErrorHandler};
pub use resolver::{DocumentResolver, PersistedQueryResolver, ResolverContext, TextResolver};
pub use store::{MemoryStore, NoOpStore, QueryStore, StoredValue};
pub use system_context::{PersistedQueries, PersistedQueriesBuilder};
