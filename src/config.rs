//! # Configuration
//!
//! Deployment configuration for persisted query resolution, loaded with the
//! `config` crate from an optional file layered under `APQ__`-prefixed
//! environment variables (`APQ__RESOLVER=document`, `APQ__STORE__BACKEND=noop`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::constants::{defaults, names};
use crate::error::ConfigurationError;
use crate::resilience::CircuitBreakerConfig;

/// What the document strategy does when query text fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// Surface the structured parse error for the item; nothing is cached
    #[default]
    Reject,
    /// Cache nothing and leave the text for the executor to reject
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store backend name (`memory`, `noop`)
    pub backend: String,

    /// Declare the pre-serialization capability on the memory backend
    pub pre_serialize: bool,

    /// Optional fail-fast protection around the backend
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: names::MEMORY_STORE.to_string(),
            pre_serialize: false,
            circuit_breaker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedQueryConfig {
    /// Resolution strategy name (`string`/`text`, `document`)
    pub resolver: String,

    /// Hash function name
    pub hash_function: String,

    /// Error handler name (`default`, `silent`)
    pub error_handler: String,

    pub parse_failure_policy: ParseFailurePolicy,

    /// Upper bound on concurrently resolving items within one batch
    pub max_concurrent_resolutions: usize,

    pub store: StoreConfig,
}

impl Default for PersistedQueryConfig {
    fn default() -> Self {
        Self {
            resolver: names::TEXT_RESOLVER.to_string(),
            hash_function: names::SHA256.to_string(),
            error_handler: names::DEFAULT_ERROR_HANDLER.to_string(),
            parse_failure_policy: ParseFailurePolicy::default(),
            max_concurrent_resolutions: defaults::MAX_CONCURRENT_RESOLUTIONS,
            store: StoreConfig::default(),
        }
    }
}

impl PersistedQueryConfig {
    /// Load from `config/persisted_queries.{toml,yaml,json}` (if present)
    /// and the environment
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(defaults::CONFIG_FILE)
    }

    /// Load from an explicit file path (extension optional, file optional)
    /// layered under the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let name = path.to_string_lossy();

        let config: Self = config::Config::builder()
            .add_source(config::File::with_name(&name).required(false))
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            source = %name,
            resolver = %config.resolver,
            store = %config.store.backend,
            max_concurrent_resolutions = config.max_concurrent_resolutions,
            "Persisted query configuration loaded"
        );

        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_concurrent_resolutions == 0 {
            return Err(ConfigurationError::Invalid(
                "max_concurrent_resolutions must be greater than 0".to_string(),
            ));
        }

        if self.resolver.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "resolver must not be empty".to_string(),
            ));
        }

        if let Some(circuit_breaker) = &self.store.circuit_breaker {
            circuit_breaker.validate()?;
        }

        Ok(())
    }
}
