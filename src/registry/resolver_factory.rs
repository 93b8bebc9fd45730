//! # Resolver Factory
//!
//! Turns a configured strategy identifier into a concrete
//! [`PersistedQueryResolver`]. Runs once while wiring the subsystem; an
//! unknown name is a configuration error, never a per-request outcome.
//!
//! ## Usage
//!
//! ```rust
//! use persisted_queries::registry::{ResolverFactory, ResolverSpec};
//! # use persisted_queries::resolver::ResolverContext;
//! # fn example(context: &ResolverContext<String>) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ResolverFactory::build(&ResolverSpec::named("document"), context)?;
//! assert_eq!(resolver.name(), "document");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::constants::names;
use crate::error::ConfigurationError;
use crate::resolver::{DocumentResolver, PersistedQueryResolver, ResolverContext, TextResolver};

/// Strategy identifier: a symbolic name or a ready-made implementation
pub enum ResolverSpec<D> {
    Named(String),
    Instance(Arc<dyn PersistedQueryResolver<D>>),
}

impl<D> ResolverSpec<D> {
    pub fn named(name: impl Into<String>) -> Self {
        ResolverSpec::Named(name.into())
    }

    pub fn instance(resolver: Arc<dyn PersistedQueryResolver<D>>) -> Self {
        ResolverSpec::Instance(resolver)
    }
}

impl<D> Clone for ResolverSpec<D> {
    fn clone(&self) -> Self {
        match self {
            ResolverSpec::Named(name) => ResolverSpec::Named(name.clone()),
            ResolverSpec::Instance(resolver) => ResolverSpec::Instance(Arc::clone(resolver)),
        }
    }
}

impl<D> std::fmt::Debug for ResolverSpec<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ResolverSpec::Instance(resolver) => {
                f.debug_tuple("Instance").field(&resolver.name()).finish()
            }
        }
    }
}

/// The strategies this crate ships
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    Text,
    Document,
}

impl ResolverKind {
    /// Match a name by convention: case, `_` and `-` are ignored and a
    /// trailing `Resolver` is optional (`string`, `StringResolver`,
    /// `string_resolver` and `text` all select the text strategy)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let stem = normalized
            .strip_suffix("resolver")
            .unwrap_or(&normalized);

        match stem {
            names::TEXT_RESOLVER | names::TEXT_RESOLVER_ALIAS => Some(ResolverKind::Text),
            names::DOCUMENT_RESOLVER => Some(ResolverKind::Document),
            _ => None,
        }
    }
}

pub struct ResolverFactory;

impl ResolverFactory {
    /// Resolve `spec` to a strategy
    ///
    /// An `Instance` is returned unchanged. A `Named` spec is matched with
    /// [`ResolverKind::from_name`] and built from `context`.
    pub fn build<D>(
        spec: &ResolverSpec<D>,
        context: &ResolverContext<D>,
    ) -> Result<Arc<dyn PersistedQueryResolver<D>>, ConfigurationError>
    where
        D: Clone + Send + Sync + 'static,
    {
        match spec {
            ResolverSpec::Instance(resolver) => {
                debug!(resolver = resolver.name(), "Using provided persisted query resolver");
                Ok(Arc::clone(resolver))
            }
            ResolverSpec::Named(name) => Self::build_by_name(name, context),
        }
    }

    pub fn build_by_name<D>(
        name: &str,
        context: &ResolverContext<D>,
    ) -> Result<Arc<dyn PersistedQueryResolver<D>>, ConfigurationError>
    where
        D: Clone + Send + Sync + 'static,
    {
        let kind = ResolverKind::from_name(name).ok_or_else(|| {
            ConfigurationError::ResolverNotFound {
                name: name.to_string(),
            }
        })?;

        let resolver: Arc<dyn PersistedQueryResolver<D>> = match kind {
            ResolverKind::Text => Arc::new(TextResolver::from_context(context)),
            ResolverKind::Document => Arc::new(DocumentResolver::from_context(context)),
        };

        crate::logging::log_registry_operation("resolver", name, resolver.name());
        Ok(resolver)
    }
}
