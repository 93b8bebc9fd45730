//! # Document Seams
//!
//! Host-provided parsing and byte serialization for executable documents.
//! This crate never inspects a document; it only needs to produce one from
//! query text and move it in and out of a store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::error::{CodecError, ParseError};

/// Parses query text into an executable document
pub trait DocumentParser<D>: Send + Sync {
    fn parse(&self, text: &str) -> Result<D, ParseError>;
}

impl<D, F> DocumentParser<D> for F
where
    F: Fn(&str) -> Result<D, ParseError> + Send + Sync,
{
    fn parse(&self, text: &str) -> Result<D, ParseError> {
        self(text)
    }
}

/// Converts documents to and from bytes for stores that cannot hold them directly
pub trait DocumentCodec<D>: Send + Sync {
    /// Identifies the payload format generation. Part of the document cache
    /// key, so bumping it orphans every payload written by an older codec.
    fn format_version(&self) -> &str;

    fn encode(&self, document: &D) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<D, CodecError>;
}

/// `serde_json` codec for any serde-capable document type
pub struct JsonDocumentCodec<D> {
    format_version: String,
    _document: PhantomData<fn() -> D>,
}

impl<D> JsonDocumentCodec<D> {
    pub fn new(format_version: impl Into<String>) -> Self {
        Self {
            format_version: format_version.into(),
            _document: PhantomData,
        }
    }
}

impl<D> Default for JsonDocumentCodec<D> {
    fn default() -> Self {
        Self::new(format!("json-{}", env!("CARGO_PKG_VERSION")))
    }
}

impl<D> std::fmt::Debug for JsonDocumentCodec<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDocumentCodec")
            .field("format_version", &self.format_version)
            .finish()
    }
}

impl<D> DocumentCodec<D> for JsonDocumentCodec<D>
where
    D: Serialize + DeserializeOwned,
{
    fn format_version(&self) -> &str {
        &self.format_version
    }

    fn encode(&self, document: &D) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(document).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<D, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
