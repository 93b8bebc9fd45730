//! # Registry Infrastructure
//!
//! Configuration-time construction of the pluggable components.
//!
//! ## Available Builders
//!
//! - **ResolverFactory**: strategy selection by name or instance
//! - **build_store**: store backend selection with optional circuit breaker
//! - **build_error_handler**: store failure handler selection
//!
//! ```text
//! Registry Infrastructure
//! ├── ResolverFactory       (text / document strategy)
//! └── components
//!     ├── build_store         (memory / noop, circuit breaker)
//!     └── build_error_handler (default / silent)
//! ```

pub mod components;
pub mod resolver_factory;

pub use components::{build_error_handler, build_store};
pub use resolver_factory::{ResolverFactory, ResolverKind, ResolverSpec};
