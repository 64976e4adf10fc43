// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the coordination layer.

use crate::storage::StorageError;
use muster_core::{LifecycleState, WorkerId};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during fleet coordination.
///
/// Heartbeat write conflicts below the retry bound are handled
/// internally and never appear here; `WriteContention` is the
/// terminal case after bounded retries are exhausted.
#[derive(Debug, Error)]
pub enum FleetError {
    /// The fleet did not converge to the broadcast state in time.
    /// Carries the last-seen state of every worker that was active at
    /// invocation, converged members included.
    #[error("fleet did not converge to '{desired}' within {timeout_ms}ms (active snapshot: {states:?})")]
    ConvergenceTimeout {
        desired: LifecycleState,
        timeout_ms: u64,
        states: BTreeMap<WorkerId, Option<LifecycleState>>,
    },

    /// Not every known worker published a fresh heartbeat in time.
    #[error("workers did not refresh within {timeout_ms}ms (stale: {stale:?})")]
    RefreshTimeout { timeout_ms: u64, stale: Vec<WorkerId> },

    /// Registry write kept conflicting after bounded retries.
    #[error("registry write contention persisted after {attempts} attempts")]
    WriteContention { attempts: u32 },

    #[error("unknown worker: {0}")]
    UnknownWorker(WorkerId),

    /// Dynamic attribute lookup named a field the record does not
    /// have. Distinct from a present-but-null field.
    #[error("worker {worker} has no field '{field}'")]
    NoSuchField { worker: WorkerId, field: String },

    /// No usable state directory could be resolved for the file store.
    #[error("no state directory (set MUSTER_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
