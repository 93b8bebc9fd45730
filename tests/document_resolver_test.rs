//! Integration tests for the parsed document strategy

mod common;

use common::*;
use persisted_queries::config::ParseFailurePolicy;
use persisted_queries::error::{ResolutionError, SourceLocation};
use persisted_queries::protocol::QueryItem;
use persisted_queries::resolver::{DocumentResolver, PersistedQueryResolver};
use persisted_queries::store::StoredValue;
use serde_json::json;
use std::sync::Arc;

fn document_key(text: &str) -> String {
    format!("document-{CODEC_VERSION}:{}", sha256(text))
}

async fn save_full(resolver: &DocumentResolver<TestDocument>, text: &str) -> QueryItem<TestDocument> {
    let mut item = full_item(text);
    let extensions = item.extensions.take().unwrap();
    resolver.resolve(item, &extensions).await.unwrap()
}

#[tokio::test]
async fn test_full_request_parses_and_caches_document() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    let resolved = save_full(&resolver, VIEWER_QUERY).await;

    assert_eq!(resolved.document, Some(TestDocument::of(VIEWER_QUERY)));
    assert!(resolved.query.is_none());
    assert_eq!(harness.parser.calls(), 1);
    assert_eq!(
        store.peek(&document_key(VIEWER_QUERY)).await,
        Some(StoredValue::Document(TestDocument::of(VIEWER_QUERY)))
    );
}

#[tokio::test]
async fn test_cache_hit_skips_parsing() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);
    save_full(&resolver, VIEWER_QUERY).await;

    let resolved = resolver
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await
        .unwrap();

    assert_eq!(resolved.document, Some(TestDocument::of(VIEWER_QUERY)));
    assert!(resolved.query.is_none());
    assert_eq!(harness.parser.calls(), 1);
}

#[tokio::test]
async fn test_hash_only_miss_is_not_found() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    let result = resolver
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await;

    assert_eq!(result.unwrap_err(), ResolutionError::NotFound);
    assert_eq!(harness.parser.calls(), 0);
}

#[tokio::test]
async fn test_wrong_hash_is_rejected_before_parsing() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    let result = resolver
        .resolve(
            QueryItem::new().with_query(VIEWER_QUERY),
            &persisted_extensions(&sha256(SEARCH_QUERY)),
        )
        .await;

    assert_eq!(result.unwrap_err(), ResolutionError::HashMismatch);
    assert_eq!(harness.parser.calls(), 0);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_parse_failure_rejects_with_located_error() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    let mut item = full_item(BROKEN_QUERY);
    let extensions = item.extensions.take().unwrap();
    let error = resolver.resolve(item, &extensions).await.unwrap_err();

    match &error {
        ResolutionError::Parse(parse_error) => {
            assert_eq!(parse_error.message, "Unexpected end of document");
            assert_eq!(
                parse_error.locations,
                vec![SourceLocation {
                    line: 1,
                    column: BROKEN_QUERY.len() + 1
                }]
            );
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(
        error.to_error_payload(),
        json!({
            "errors": [{
                "message": "Unexpected end of document",
                "locations": [{ "line": 1, "column": BROKEN_QUERY.len() + 1 }]
            }]
        })
    );
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn test_parse_failure_deferred_keeps_text() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::with_policy(store.clone(), ParseFailurePolicy::Defer);
    let resolver = DocumentResolver::from_context(&harness.context);

    let resolved = save_full(&resolver, BROKEN_QUERY).await;

    assert_eq!(resolved.query.as_deref(), Some(BROKEN_QUERY));
    assert!(resolved.document.is_none());
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn test_pre_serialized_store_receives_encoded_bytes() {
    let store = Arc::new(RecordingStore::<TestDocument>::pre_serialized());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    save_full(&resolver, VIEWER_QUERY).await;

    let expected = serde_json::to_vec(&TestDocument::of(VIEWER_QUERY)).unwrap();
    assert_eq!(
        store.peek(&document_key(VIEWER_QUERY)).await,
        Some(StoredValue::Bytes(expected))
    );

    let resolved = resolver
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await
        .unwrap();
    assert_eq!(resolved.document, Some(TestDocument::of(VIEWER_QUERY)));
    assert_eq!(harness.parser.calls(), 1);
}

#[tokio::test]
async fn test_plain_store_is_never_given_bytes() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);

    save_full(&resolver, SEARCH_QUERY).await;

    assert!(matches!(
        store.peek(&document_key(SEARCH_QUERY)).await,
        Some(StoredValue::Document(_))
    ));
}

#[tokio::test]
async fn test_corrupt_payload_is_deleted_once_and_missed() {
    let store = Arc::new(RecordingStore::<TestDocument>::pre_serialized());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);
    let key = document_key(VIEWER_QUERY);
    store
        .seed(&key, StoredValue::Bytes(b"\x00not a document".to_vec()))
        .await;

    let result = resolver
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await;

    assert_eq!(result.unwrap_err(), ResolutionError::NotFound);
    assert_eq!(store.deletes(), 1);
    assert!(store.peek(&key).await.is_none());
    assert_eq!(harness.handler.count(), 0);
}

#[tokio::test]
async fn test_codec_version_change_orphans_old_entries() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let resolver = DocumentResolver::from_context(&harness.context);
    save_full(&resolver, VIEWER_QUERY).await;

    let mut next = TestHarness::new(store.clone());
    next.context.codec = Arc::new(persisted_queries::document::JsonDocumentCodec::<
        TestDocument,
    >::new("test-v2"));
    let upgraded = DocumentResolver::from_context(&next.context);

    assert_eq!(upgraded.namespace(), "document-test-v2");
    let result = upgraded
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await;
    assert_eq!(result.unwrap_err(), ResolutionError::NotFound);
}

#[tokio::test]
async fn test_text_and_document_namespaces_do_not_collide() {
    let store = Arc::new(RecordingStore::<TestDocument>::new());
    let harness = TestHarness::new(store.clone());
    let documents = DocumentResolver::from_context(&harness.context);
    let texts = persisted_queries::resolver::TextResolver::from_context(&harness.context);

    save_full(&documents, VIEWER_QUERY).await;

    let result = texts
        .resolve(QueryItem::new(), &persisted_extensions(&sha256(VIEWER_QUERY)))
        .await;
    assert_eq!(result.unwrap_err(), ResolutionError::NotFound);
    assert_eq!(store.deletes(), 0);
}
