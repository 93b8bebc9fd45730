//! # Component Builders
//!
//! Name-based construction of the store backend and error handler from
//! [`StoreConfig`] and the configured handler name.

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::constants::names;
use crate::error::ConfigurationError;
use crate::resilience::{CircuitBreaker, DefaultErrorHandler, ErrorHandler, SilentErrorHandler};
use crate::store::{CircuitBreakerStore, MemoryStore, NoOpStore, QueryStore};

/// Build the configured store backend, wrapped in a circuit breaker when one
/// is configured
pub fn build_store<D>(config: &StoreConfig) -> Result<Arc<dyn QueryStore<D>>, ConfigurationError>
where
    D: Clone + Send + Sync + 'static,
{
    let backend: Arc<dyn QueryStore<D>> = match config.backend.trim().to_ascii_lowercase().as_str()
    {
        names::MEMORY_STORE if config.pre_serialize => Arc::new(MemoryStore::<D>::pre_serialized()),
        names::MEMORY_STORE => Arc::new(MemoryStore::<D>::new()),
        names::NOOP_STORE => Arc::new(NoOpStore::new()),
        _ => {
            return Err(ConfigurationError::StoreNotFound {
                name: config.backend.clone(),
            })
        }
    };

    let store = match &config.circuit_breaker {
        Some(cb_config) => {
            cb_config.validate()?;
            let circuit_breaker = Arc::new(CircuitBreaker::new(
                format!("persisted_query_store:{}", backend.provider_name()),
                cb_config,
            ));
            Arc::new(CircuitBreakerStore::new(backend, circuit_breaker)) as Arc<dyn QueryStore<D>>
        }
        None => backend,
    };

    crate::logging::log_registry_operation("store", &config.backend, store.provider_name());
    Ok(store)
}

/// Build an error handler by name (`default`, `silent`)
pub fn build_error_handler(name: &str) -> Result<Arc<dyn ErrorHandler>, ConfigurationError> {
    match name.trim().to_ascii_lowercase().as_str() {
        names::DEFAULT_ERROR_HANDLER => Ok(Arc::new(DefaultErrorHandler)),
        names::SILENT_ERROR_HANDLER => Ok(Arc::new(SilentErrorHandler)),
        _ => Err(ConfigurationError::ErrorHandlerNotFound {
            name: name.to_string(),
        }),
    }
}
