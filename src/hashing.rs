//! # Hash Functions
//!
//! Content hashing for persisted query verification. The hash function is
//! injected configuration: the default is SHA-256 rendered as lowercase hex,
//! and any `Fn(&str) -> String` can stand in for it.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use crate::constants::names;
use crate::error::{ConfigurationError, ResolutionError, ResolutionResult};

/// Deterministic, collision-resistant hash of a query string
pub trait QueryHasher: Send + Sync {
    fn hash(&self, text: &str) -> String;
}

impl<F> QueryHasher for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn hash(&self, text: &str) -> String {
        self(text)
    }
}

/// SHA-256 hex digest, the hash the APQ protocol names in `sha256Hash`
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl QueryHasher for Sha256Hasher {
    fn hash(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Resolve a hash function by name
pub fn build(name: &str) -> Result<Arc<dyn QueryHasher>, ConfigurationError> {
    match name.trim().to_ascii_lowercase().as_str() {
        names::SHA256 => Ok(Arc::new(Sha256Hasher)),
        _ => Err(ConfigurationError::HashFunctionNotFound {
            name: name.to_string(),
        }),
    }
}

/// Check that `text` hashes to the client-claimed `claimed_hash`
pub fn verify(hasher: &dyn QueryHasher, text: &str, claimed_hash: &str) -> ResolutionResult<()> {
    let actual = hasher.hash(text);
    if actual == claimed_hash {
        Ok(())
    } else {
        debug!(
            claimed_hash = %claimed_hash,
            actual_hash = %actual,
            "Persisted query hash mismatch"
        );
        Err(ResolutionError::HashMismatch)
    }
}
