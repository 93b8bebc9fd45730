//! # Protocol Types
//!
//! The per-request query item, persisted query extension parsing and cache
//! key derivation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::{extensions, namespaces};

/// One query of a (possibly batched) request
///
/// `query` and `extensions` are the fields this crate reads. Everything else
/// (variables, operation name, context) is carried in `fields` untouched.
/// `document` is filled by the document resolution strategy and never
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub struct QueryItem<D> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,

    #[serde(skip)]
    pub document: Option<D>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl<D> Default for QueryItem<D> {
    fn default() -> Self {
        Self {
            query: None,
            extensions: None,
            document: None,
            fields: Map::new(),
        }
    }
}

impl<D> QueryItem<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Attach `{"persistedQuery": {"sha256Hash": hash}}` extensions
    pub fn with_persisted_hash(self, hash: impl Into<String>) -> Self {
        let mut persisted = Map::new();
        persisted.insert(extensions::SHA256_HASH.to_string(), Value::String(hash.into()));

        let mut ext = Map::new();
        ext.insert(
            extensions::PERSISTED_QUERY.to_string(),
            Value::Object(persisted),
        );
        self.with_extensions(Value::Object(ext))
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// Claimed hash from `persistedQuery.sha256Hash`, if present and a string
pub fn persisted_query_hash(extensions: &Value) -> Option<&str> {
    extensions
        .get(extensions::PERSISTED_QUERY)?
        .get(extensions::SHA256_HASH)?
        .as_str()
}

/// Store key for a verified or claimed hash under a strategy namespace
///
/// The namespace ties entries to one strategy (and, for documents, one codec
/// format generation) so that strategies sharing a backend never read each
/// other's values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(namespace: &str, hash: &str) -> Self {
        Self(format!("{namespace}{}{hash}", namespaces::SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
