//! # Persisted Query System Context
//!
//! Dependency injection container for persisted query resolution. Combines
//! [`PersistedQueryConfig`] with the host-provided parser and codec, applies
//! any explicit overrides, and builds the configured strategy exactly once.

use std::sync::Arc;
use tracing::info;

use crate::config::{ParseFailurePolicy, PersistedQueryConfig};
use crate::document::{DocumentCodec, DocumentParser};
use crate::error::ConfigurationError;
use crate::hashing::{self, QueryHasher};
use crate::multiplex::{MultiplexExecutor, MultiplexResolver};
use crate::registry::{self, ResolverFactory, ResolverSpec};
use crate::resilience::{ErrorHandler, RecoveringStore};
use crate::resolver::{PersistedQueryResolver, ResolverContext};
use crate::store::QueryStore;

/// A wired persisted query subsystem
pub struct PersistedQueries<D> {
    config: PersistedQueryConfig,
    context: ResolverContext<D>,
    resolver: Arc<dyn PersistedQueryResolver<D>>,
}

impl<D> std::fmt::Debug for PersistedQueries<D>
where
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedQueries")
            .field("resolver", &self.resolver.name())
            .field("context", &self.context)
            .field("max_concurrent_resolutions", &self.config.max_concurrent_resolutions)
            .finish()
    }
}

impl<D> PersistedQueries<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub fn builder(
        parser: Arc<dyn DocumentParser<D>>,
        codec: Arc<dyn DocumentCodec<D>>,
    ) -> PersistedQueriesBuilder<D> {
        PersistedQueriesBuilder::new(parser, codec)
    }

    pub fn config(&self) -> &PersistedQueryConfig {
        &self.config
    }

    pub fn context(&self) -> &ResolverContext<D> {
        &self.context
    }

    pub fn resolver(&self) -> &Arc<dyn PersistedQueryResolver<D>> {
        &self.resolver
    }

    /// Batch resolver executing through `executor`
    pub fn multiplex(&self, executor: Arc<dyn MultiplexExecutor<D>>) -> MultiplexResolver<D> {
        MultiplexResolver::new(Arc::clone(&self.resolver), executor)
            .with_max_concurrency(self.config.max_concurrent_resolutions)
    }
}

/// Builder for [`PersistedQueries`]
///
/// Components not set explicitly are built from the configuration by name.
pub struct PersistedQueriesBuilder<D> {
    config: PersistedQueryConfig,
    parser: Arc<dyn DocumentParser<D>>,
    codec: Arc<dyn DocumentCodec<D>>,
    store: Option<Arc<dyn QueryStore<D>>>,
    hasher: Option<Arc<dyn QueryHasher>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    resolver: Option<ResolverSpec<D>>,
    parse_failure_policy: Option<ParseFailurePolicy>,
}

impl<D> PersistedQueriesBuilder<D>
where
    D: Clone + Send + Sync + 'static,
{
    pub fn new(parser: Arc<dyn DocumentParser<D>>, codec: Arc<dyn DocumentCodec<D>>) -> Self {
        Self {
            config: PersistedQueryConfig::default(),
            parser,
            codec,
            store: None,
            hasher: None,
            error_handler: None,
            resolver: None,
            parse_failure_policy: None,
        }
    }

    pub fn config(mut self, config: PersistedQueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn QueryStore<D>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn QueryHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(error_handler);
        self
    }

    pub fn resolver(mut self, resolver: ResolverSpec<D>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.parse_failure_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<PersistedQueries<D>, ConfigurationError> {
        self.config.validate()?;

        let store = match self.store {
            Some(store) => store,
            None => registry::build_store(&self.config.store)?,
        };
        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => hashing::build(&self.config.hash_function)?,
        };
        let error_handler = match self.error_handler {
            Some(handler) => handler,
            None => registry::build_error_handler(&self.config.error_handler)?,
        };
        let parse_failure_policy = self
            .parse_failure_policy
            .unwrap_or(self.config.parse_failure_policy);

        let context = ResolverContext {
            store: RecoveringStore::new(store, error_handler),
            hasher,
            parser: self.parser,
            codec: self.codec,
            parse_failure_policy,
        };

        let spec = self
            .resolver
            .unwrap_or_else(|| ResolverSpec::named(self.config.resolver.clone()));
        let resolver = ResolverFactory::build(&spec, &context)?;

        info!(
            resolver = resolver.name(),
            store = context.store.store().provider_name(),
            max_concurrent_resolutions = self.config.max_concurrent_resolutions,
            "Persisted queries initialized"
        );

        Ok(PersistedQueries {
            config: self.config,
            context,
            resolver,
        })
    }
}
