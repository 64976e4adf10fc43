// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn generated_ids_have_prefix_and_length() {
    let id = WorkerId::generate();
    assert!(id.as_str().starts_with("wkr-"));
    assert_eq!(id.suffix().len(), 19);
}

#[test]
fn generated_ids_are_distinct() {
    let ids: HashSet<WorkerId> = (0..1000).map(|_| WorkerId::generate()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn short_truncates_suffix() {
    let id = WorkerId::from_string("wkr-abcdefghij");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefghij");
}

#[test]
fn serde_is_transparent() {
    let id = WorkerId::from_string("wkr-test123");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"wkr-test123\"");
    let back: WorkerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn compares_against_str() {
    let id = WorkerId::from_string("wkr-x");
    assert_eq!(id, "wkr-x");
    assert_eq!(id.to_string(), "wkr-x");
}
