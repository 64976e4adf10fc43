// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn doc(rev: u64, body: serde_json::Value) -> Document {
    Document { doc_type: "fleet".to_string(), id: "heartbeats".to_string(), rev, body }
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::open(dir.path()).unwrap();

    let outcome = storage.put(doc(0, json!({"workers": {}}))).await.unwrap();
    assert_eq!(outcome, PutOutcome::Stored(1));

    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();
    assert_eq!(stored.rev, 1);
    assert_eq!(stored.body, json!({"workers": {}}));
}

#[tokio::test]
async fn stale_rev_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::open(dir.path()).unwrap();
    storage.put(doc(0, json!({"n": 1}))).await.unwrap();
    storage.put(doc(1, json!({"n": 2}))).await.unwrap();

    match storage.put(doc(1, json!({"n": 3}))).await.unwrap() {
        PutOutcome::Conflict(current) => assert_eq!(current.body, json!({"n": 2})),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn two_handles_see_each_others_writes() {
    let dir = tempfile::tempdir().unwrap();
    let a = FsStorage::open(dir.path()).unwrap();
    let b = FsStorage::open(dir.path()).unwrap();

    a.put(doc(0, json!({"from": "a"}))).await.unwrap();
    let seen = b.get("fleet", "heartbeats").await.unwrap().unwrap();
    assert_eq!(seen.body, json!({"from": "a"}));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::open(dir.path()).unwrap();
    storage.put(doc(0, json!({}))).await.unwrap();
    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();

    storage.delete(&stored).await.unwrap();
    storage.delete(&stored).await.unwrap();
    assert!(storage.get("fleet", "heartbeats").await.unwrap().is_none());
}

#[tokio::test]
async fn stale_rev_on_deleted_document_is_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::open(dir.path()).unwrap();
    storage.put(doc(0, json!({"n": 1}))).await.unwrap();
    let stored = storage.get("fleet", "heartbeats").await.unwrap().unwrap();
    storage.delete(&stored).await.unwrap();

    let outcome = storage.put(doc(1, json!({"n": 2}))).await.unwrap();
    assert_eq!(outcome, PutOutcome::Deleted);
    assert_eq!(storage.put(doc(0, json!({"n": 2}))).await.unwrap(), PutOutcome::Stored(1));
}

#[tokio::test]
async fn corrupt_file_reports_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FsStorage::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("fleet__heartbeats.json"), b"not json").unwrap();

    let err = storage.get("fleet", "heartbeats").await.unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}
