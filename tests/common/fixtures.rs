//! Shared document type, parser and context builders for integration tests

use persisted_queries::config::ParseFailurePolicy;
use persisted_queries::document::{DocumentParser, JsonDocumentCodec};
use persisted_queries::error::{ParseError, StoreError};
use persisted_queries::hashing::{QueryHasher, Sha256Hasher};
use persisted_queries::protocol::QueryItem;
use persisted_queries::resilience::{ErrorHandler, RecoveringStore};
use persisted_queries::resolver::ResolverContext;
use persisted_queries::store::QueryStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CODEC_VERSION: &str = "test-v1";

pub const VIEWER_QUERY: &str = "{ viewer { id name } }";
pub const SEARCH_QUERY: &str = "query Search { search(term: \"rust\") { id } }";
pub const BROKEN_QUERY: &str = "{ viewer { id }";

/// Minimal parsed form: the query split into tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDocument {
    pub tokens: Vec<String>,
}

impl TestDocument {
    pub fn of(text: &str) -> Self {
        Self {
            tokens: text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Parser that rejects unbalanced braces and counts its invocations
#[derive(Debug, Default)]
pub struct TestParser {
    calls: AtomicUsize,
}

impl TestParser {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentParser<TestDocument> for TestParser {
    fn parse(&self, text: &str) -> Result<TestDocument, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut depth = 0usize;
        let (mut line, mut column) = (1usize, 0usize);
        for c in text.chars() {
            if c == '\n' {
                line += 1;
                column = 0;
                continue;
            }
            column += 1;
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => {
                    return Err(ParseError::at("Unexpected '}'", line, column));
                }
                '}' => depth -= 1,
                _ => {}
            }
        }

        if depth > 0 {
            return Err(ParseError::at(
                "Unexpected end of document",
                line,
                column + 1,
            ));
        }
        Ok(TestDocument::of(text))
    }
}

pub fn sha256(text: &str) -> String {
    Sha256Hasher.hash(text)
}

/// Extensions object claiming `hash`
pub fn persisted_extensions(hash: &str) -> Value {
    QueryItem::<TestDocument>::new()
        .with_persisted_hash(hash)
        .extensions
        .unwrap_or(Value::Null)
}

/// Item carrying both text and its correct hash
pub fn full_item(text: &str) -> QueryItem<TestDocument> {
    QueryItem::new()
        .with_query(text)
        .with_persisted_hash(sha256(text))
}

/// Item carrying only a hash
pub fn hash_only_item(hash: &str) -> QueryItem<TestDocument> {
    QueryItem::new().with_persisted_hash(hash)
}

/// Error handler that remembers every error it receives
#[derive(Debug, Default)]
pub struct CountingErrorHandler {
    errors: parking_lot::Mutex<Vec<StoreError>>,
}

impl CountingErrorHandler {
    pub fn count(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn errors(&self) -> Vec<StoreError> {
        self.errors.lock().clone()
    }
}

impl ErrorHandler for CountingErrorHandler {
    fn call(&self, error: &StoreError) {
        self.errors.lock().push(error.clone());
    }
}

/// Everything a resolver test needs, with handles kept for assertions
pub struct TestHarness {
    pub parser: Arc<TestParser>,
    pub handler: Arc<CountingErrorHandler>,
    pub context: ResolverContext<TestDocument>,
}

impl TestHarness {
    pub fn new(store: Arc<dyn QueryStore<TestDocument>>) -> Self {
        Self::with_policy(store, ParseFailurePolicy::Reject)
    }

    pub fn with_policy(
        store: Arc<dyn QueryStore<TestDocument>>,
        parse_failure_policy: ParseFailurePolicy,
    ) -> Self {
        let parser = Arc::new(TestParser::default());
        let handler = Arc::new(CountingErrorHandler::default());
        let context = ResolverContext {
            store: RecoveringStore::new(store, handler.clone()),
            hasher: Arc::new(Sha256Hasher),
            parser: parser.clone(),
            codec: Arc::new(JsonDocumentCodec::<TestDocument>::new(CODEC_VERSION)),
            parse_failure_policy,
        };
        Self {
            parser,
            handler,
            context,
        }
    }
}
