// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn doc(rev: u64, body: serde_json::Value) -> Document {
    Document { doc_type: "fleet".to_string(), id: "heartbeats".to_string(), rev, body }
}

#[tokio::test]
async fn first_put_assigns_rev_one() {
    let storage = MemoryStorage::new();
    let outcome = storage.put(doc(0, json!({"n": 1}))).await.unwrap();
    assert_eq!(outcome, PutOutcome::Stored(1));

    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();
    assert_eq!(stored.rev, 1);
    assert_eq!(stored.body, json!({"n": 1}));
}

#[tokio::test]
async fn stale_rev_conflicts_with_current_document() {
    let storage = MemoryStorage::new();
    storage.put(doc(0, json!({"n": 1}))).await.unwrap();
    storage.put(doc(1, json!({"n": 2}))).await.unwrap();

    // A writer that read rev 1 loses to the rev-2 write above.
    let outcome = storage.put(doc(1, json!({"n": 99}))).await.unwrap();
    match outcome {
        PutOutcome::Conflict(current) => {
            assert_eq!(current.rev, 2);
            assert_eq!(current.body, json!({"n": 2}));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn clones_share_state() {
    let storage = MemoryStorage::new();
    let other = storage.clone();
    storage.put(doc(0, json!({}))).await.unwrap();
    assert!(other.get("fleet", "heartbeats").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_removes_document() {
    let storage = MemoryStorage::new();
    storage.put(doc(0, json!({}))).await.unwrap();
    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();
    storage.delete(&stored).await.unwrap();
    assert!(storage.get("fleet", "heartbeats").await.unwrap().is_none());
}

#[tokio::test]
async fn stale_rev_on_deleted_document_is_distinct() {
    let storage = MemoryStorage::new();
    storage.put(doc(0, json!({"n": 1}))).await.unwrap();
    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();
    storage.delete(&stored).await.unwrap();

    // The writer read rev 1, but the document is gone.
    let outcome = storage.put(doc(1, json!({"n": 2}))).await.unwrap();
    assert_eq!(outcome, PutOutcome::Deleted);

    // A re-read sees no document, so the retry writes at rev 0.
    assert_eq!(storage.put(doc(0, json!({"n": 2}))).await.unwrap(), PutOutcome::Stored(1));
}

#[tokio::test]
async fn get_missing_returns_none() {
    let storage = MemoryStorage::new();
    assert!(storage.get("fleet", "nope").await.unwrap().is_none());
}
