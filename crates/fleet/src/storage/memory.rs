// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory storage backend.
//!
//! Clones share the same map, so a test can hand the "same" storage
//! to several workers and a coordinator the way separate processes
//! would share a real backend.

use super::{Document, PutOutcome, Storage, StorageError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    docs: Arc<Mutex<HashMap<(String, String), Document>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, doc_type: &str, id: &str) -> Result<Option<Document>, StorageError> {
        let docs = self.docs.lock();
        Ok(docs.get(&(doc_type.to_string(), id.to_string())).cloned())
    }

    async fn put(&self, mut doc: Document) -> Result<PutOutcome, StorageError> {
        let mut docs = self.docs.lock();
        let key = (doc.doc_type.clone(), doc.id.clone());
        let current_rev = docs.get(&key).map(|d| d.rev).unwrap_or(0);
        if doc.rev != current_rev {
            // Stale write: hand back the current version.
            return Ok(match docs.get(&key) {
                Some(current) => PutOutcome::Conflict(current.clone()),
                None => PutOutcome::Deleted,
            });
        }
        doc.rev = current_rev + 1;
        let new_rev = doc.rev;
        docs.insert(key, doc);
        Ok(PutOutcome::Stored(new_rev))
    }

    async fn delete(&self, doc: &Document) -> Result<(), StorageError> {
        let mut docs = self.docs.lock();
        docs.remove(&(doc.doc_type.clone(), doc.id.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
