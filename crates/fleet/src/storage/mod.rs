// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared document storage with optimistic concurrency.
//!
//! Every cross-process value in this crate (the heartbeat registry,
//! the fleet control flags) is one [`Document`]. Writers must present
//! the revision they last read; a mismatch returns the current
//! document so the caller can re-merge and retry.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A versioned JSON document, keyed by `(doc_type, id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_type: String,
    pub id: String,
    /// Revision the writer last read. 0 means "never stored"; the
    /// backend assigns 1 on first successful put.
    pub rev: u64,
    pub body: serde_json::Value,
}

impl Document {
    /// Encode a typed body at a given revision.
    pub fn encode<T: Serialize>(
        doc_type: &str,
        id: &str,
        rev: u64,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            rev,
            body: serde_json::to_value(body)?,
        })
    }

    /// Decode the body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

/// Result of an optimistic put.
#[derive(Debug, Clone, PartialEq)]
pub enum PutOutcome {
    /// Write accepted; carries the newly assigned revision.
    Stored(u64),
    /// The document changed since the writer's read. Carries the
    /// current version so the caller can re-merge.
    Conflict(Document),
    /// The writer's revision is stale and the document no longer
    /// exists: it was deleted since the read. A re-read sees rev 0.
    Deleted,
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt document {doc_type}/{id}: {source}")]
    Corrupt {
        doc_type: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The narrow interface every backend provides. Compare-and-swap
/// semantics on `put` are the only consistency primitive the
/// coordination layer relies on.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, doc_type: &str, id: &str) -> Result<Option<Document>, StorageError>;

    async fn put(&self, doc: Document) -> Result<PutOutcome, StorageError>;

    async fn delete(&self, doc: &Document) -> Result<(), StorageError>;
}
