//! # Error Types
//!
//! Structured error handling for persisted query resolution using thiserror.
//!
//! Errors fall into two groups. [`ResolutionError`] values are expected,
//! client-triggerable outcomes that end up in the batch response as data.
//! Everything else ([`StoreError`], [`CodecError`], [`ConfigurationError`],
//! [`MultiplexError`]) describes infrastructure or setup failures.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::messages;

/// Position of a syntax error inside the query text (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

/// Syntax error reported by the host query parser
///
/// Serializes to the same `{message, locations}` shape the query engine uses
/// for syntax errors outside the persisted query flow.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceLocation>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
        }
    }

    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            locations: vec![SourceLocation { line, column }],
        }
    }

    /// Structured error object as it appears inside an `errors` array
    pub fn to_error_object(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "message": self.message }))
    }
}

/// Per-item resolution outcomes that are returned to the client as data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Hash-only request with nothing cached under the hash
    #[error("{}", messages::NOT_FOUND)]
    NotFound,

    /// Claimed hash does not match the hash of the provided query text
    #[error("{}", messages::HASH_MISMATCH)]
    HashMismatch,

    /// Query text could not be parsed into a document
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ResolutionError {
    /// Batch-level response entry for an item that failed to resolve
    pub fn to_error_payload(&self) -> Value {
        match self {
            ResolutionError::Parse(parse_error) => {
                json!({ "errors": [parse_error.to_error_object()] })
            }
            other => json!({ "errors": [{ "message": other.to_string() }] }),
        }
    }
}

pub type ResolutionResult<T> = std::result::Result<T, ResolutionError>;

/// Errors raised by a store backend during fetch, save or delete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Failed to connect to the store backend
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Failed to serialize or deserialize a stored value
    #[error("Store serialization error: {0}")]
    Serialization(String),

    /// Store operation timed out
    #[error("Store operation timed out: {0}")]
    Timeout(String),

    /// Generic backend error
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document payload could not be encoded or decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Document encode error: {0}")]
    Encode(String),

    #[error("Document decode error: {0}")]
    Decode(String),
}

impl From<CodecError> for StoreError {
    fn from(error: CodecError) -> Self {
        StoreError::Serialization(error.to_string())
    }
}

/// Setup-time errors raised while wiring the subsystem
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("persisted query resolver for :{name} has not been found")]
    ResolverNotFound { name: String },

    #[error("persisted query store for :{name} has not been found")]
    StoreNotFound { name: String },

    #[error("hash function :{name} has not been found")]
    HashFunctionNotFound { name: String },

    #[error("persisted query error handler for :{name} has not been found")]
    ErrorHandlerNotFound { name: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Failures of the batch execution step itself
#[derive(Debug, Error)]
pub enum MultiplexError {
    #[error("Multiplex execution failed: {0}")]
    Execution(String),

    #[error("Executor returned {actual} results for {expected} queries")]
    ResultCountMismatch { expected: usize, actual: usize },
}

/// Crate-level error covering every failure class
#[derive(Debug, Error)]
pub enum PersistedQueryError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Multiplex(#[from] MultiplexError),
}

pub type Result<T> = std::result::Result<T, PersistedQueryError>;
