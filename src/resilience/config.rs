//! # Circuit Breaker Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigurationError;

/// Configuration for a single circuit breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,

    /// Seconds to wait in open state before attempting recovery
    pub timeout_seconds: u64,

    /// Number of successful calls in half-open state to close circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::for_store()
    }
}

impl CircuitBreakerConfig {
    /// Defaults for a networked cache backend
    pub fn for_store() -> Self {
        Self {
            failure_threshold: 5,
            timeout_seconds: 30,
            success_threshold: 2,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.failure_threshold == 0 {
            return Err(ConfigurationError::Invalid(
                "circuit_breaker.failure_threshold must be greater than 0".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid(
                "circuit_breaker.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.timeout_seconds > 300 {
            return Err(ConfigurationError::Invalid(
                "circuit_breaker.timeout_seconds should not exceed 300".to_string(),
            ));
        }

        if self.success_threshold == 0 {
            return Err(ConfigurationError::Invalid(
                "circuit_breaker.success_threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
