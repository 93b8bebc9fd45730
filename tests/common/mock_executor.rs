//! Batch executor double

use async_trait::async_trait;
use parking_lot::Mutex;
use persisted_queries::error::MultiplexError;
use persisted_queries::multiplex::{ExecutionOptions, MultiplexExecutor};
use persisted_queries::protocol::QueryItem;
use serde_json::{json, Value};

use super::TestDocument;

/// What the executor saw for one item
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedItem {
    pub query: Option<String>,
    pub document: Option<TestDocument>,
    pub extensions: Option<Value>,
    pub operation_name: Option<String>,
}

/// Executor that answers `{"data": {"echo": <query or tokens>}}` per item and
/// records every batch
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    batches: Mutex<Vec<Vec<ExecutedItem>>>,
    options: Mutex<Vec<ExecutionOptions>>,
    drop_results: bool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that returns one result fewer than it was given
    pub fn short_changing() -> Self {
        Self {
            drop_results: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<ExecutedItem>> {
        self.batches.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn options(&self) -> Vec<ExecutionOptions> {
        self.options.lock().clone()
    }
}

pub fn echo_result(item: &QueryItem<TestDocument>) -> Value {
    match (&item.document, &item.query) {
        (Some(document), _) => json!({ "data": { "tokens": document.tokens.len() } }),
        (None, Some(query)) => json!({ "data": { "echo": query } }),
        (None, None) => json!({ "errors": [{ "message": "No query string was present" }] }),
    }
}

#[async_trait]
impl MultiplexExecutor<TestDocument> for RecordingExecutor {
    async fn execute_batch(
        &self,
        items: Vec<QueryItem<TestDocument>>,
        options: &ExecutionOptions,
    ) -> Result<Vec<Value>, MultiplexError> {
        let mut results: Vec<Value> = items.iter().map(echo_result).collect();
        if self.drop_results {
            results.pop();
        }

        let executed = items
            .into_iter()
            .map(|item| ExecutedItem {
                operation_name: item
                    .fields
                    .get("operationName")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                query: item.query,
                document: item.document,
                extensions: item.extensions,
            })
            .collect();
        self.batches.lock().push(executed);
        self.options.lock().push(options.clone());

        Ok(results)
    }
}
