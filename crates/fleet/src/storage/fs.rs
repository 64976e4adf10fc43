// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed storage backend.
//!
//! One JSON file per document under a state directory, with an
//! exclusive lock file bracketing every read-modify-write so workers
//! and the operator CLI in separate processes get real CAS semantics.
//! Writes go through a temp file + rename.

use super::{Document, PutOutcome, Storage, StorageError};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn doc_path(&self, doc_type: &str, id: &str) -> PathBuf {
        // Keys are well-known short names; keep separators out of the
        // file name regardless.
        let name = format!("{}__{}.json", doc_type.replace('/', "_"), id.replace('/', "_"));
        self.root.join(name)
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_path = self.root.join(".lock");
        let file = OpenOptions::new().create(true).truncate(false).write(true).open(lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read_doc(path: &Path, doc_type: &str, id: &str) -> Result<Option<Document>, StorageError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let doc = serde_json::from_slice(&raw).map_err(|source| StorageError::Corrupt {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            source,
        })?;
        Ok(Some(doc))
    }

    fn write_doc(&self, path: &Path, doc: &Document) -> Result<(), StorageError> {
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(doc).map_err(|source| StorageError::Corrupt {
            doc_type: doc.doc_type.clone(),
            id: doc.id.clone(),
            source,
        })?;
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn get(&self, doc_type: &str, id: &str) -> Result<Option<Document>, StorageError> {
        let _guard = self.lock()?;
        Self::read_doc(&self.doc_path(doc_type, id), doc_type, id)
    }

    async fn put(&self, mut doc: Document) -> Result<PutOutcome, StorageError> {
        let _guard = self.lock()?;
        let path = self.doc_path(&doc.doc_type, &doc.id);
        let current = Self::read_doc(&path, &doc.doc_type, &doc.id)?;
        let current_rev = current.as_ref().map(|d| d.rev).unwrap_or(0);
        if doc.rev != current_rev {
            return Ok(match current {
                Some(current) => PutOutcome::Conflict(current),
                None => PutOutcome::Deleted,
            });
        }
        doc.rev = current_rev + 1;
        self.write_doc(&path, &doc)?;
        Ok(PutOutcome::Stored(doc.rev))
    }

    async fn delete(&self, doc: &Document) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        match std::fs::remove_file(self.doc_path(&doc.doc_type, &doc.id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
