// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared persistence façade over the heartbeat registry and the
//! fleet control document.
//!
//! All writes go through a read-merge-write loop with bounded retries
//! and exponential backoff; a write that keeps conflicting past the
//! bound surfaces as [`FleetError::WriteContention`] instead of
//! live-locking under fleet-wide contention.

use crate::error::FleetError;
use crate::storage::{Document, PutOutcome, Storage};
use muster_core::{
    Clock, FleetControl, HeartbeatRecord, HeartbeatRegistry, LifecycleState, SampleWindow,
    WorkerId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Document type shared by all fleet-coordination documents.
pub const DOC_TYPE: &str = "fleet";
/// Well-known id of the heartbeat registry document.
pub const REGISTRY_DOC_ID: &str = "heartbeats";
/// Well-known id of the control-flags document.
pub const CONTROL_DOC_ID: &str = "control";

/// Bounded CAS retry: attempts before giving up with `WriteContention`.
pub const MAX_PUT_ATTEMPTS: u32 = 10;
const BACKOFF_BASE: Duration = Duration::from_millis(5);
const BACKOFF_CAP: Duration = Duration::from_millis(500);

pub struct HeartbeatStore<S, C> {
    storage: Arc<S>,
    clock: C,
}

impl<S, C: Clone> Clone for HeartbeatStore<S, C> {
    fn clone(&self) -> Self {
        Self { storage: Arc::clone(&self.storage), clock: self.clock.clone() }
    }
}

impl<S: Storage, C: Clock> HeartbeatStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self { storage: Arc::new(storage), clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Read the registry document. A missing document is an empty
    /// registry at revision 0.
    pub async fn registry(&self) -> Result<(HeartbeatRegistry, u64), FleetError> {
        match self.storage.get(DOC_TYPE, REGISTRY_DOC_ID).await? {
            Some(doc) => {
                let registry = doc.decode()?;
                Ok((registry, doc.rev))
            }
            None => Ok((HeartbeatRegistry::default(), 0)),
        }
    }

    /// Read the control document (desired state + coordination mode).
    pub async fn control(&self) -> Result<FleetControl, FleetError> {
        match self.storage.get(DOC_TYPE, CONTROL_DOC_ID).await? {
            Some(doc) => Ok(doc.decode()?),
            None => Ok(FleetControl::default()),
        }
    }

    pub async fn desired_state(&self) -> Result<Option<LifecycleState>, FleetError> {
        Ok(self.control().await?.desired_state)
    }

    pub async fn coordinating(&self) -> Result<bool, FleetError> {
        Ok(self.control().await?.coordinating)
    }

    /// Merge a worker's record into the registry and write it back.
    ///
    /// Merge, not replace: when the write carries no samples (a
    /// writer that cannot recompute metrics), the stored aggregates
    /// are carried forward so concurrent readers keep seeing the last
    /// real values. `put_at` is stamped fresh on every attempt.
    pub async fn save_record(
        &self,
        record: &HeartbeatRecord,
        mut samples: Option<&mut SampleWindow>,
    ) -> Result<HeartbeatRecord, FleetError> {
        let mut delay = BACKOFF_BASE;
        for attempt in 1..=MAX_PUT_ATTEMPTS {
            let (mut registry, rev) = self.registry().await?;
            let now_ms = self.clock.epoch_ms();

            let mut merged = record.clone();
            match samples.as_deref_mut() {
                Some(window) => {
                    window.prune(now_ms);
                    merged.apply_aggregates(&window.aggregates(now_ms));
                }
                None => {
                    if let Some(previous) = registry.workers.get(&merged.id) {
                        merged.carry_metrics_from(previous);
                    }
                }
            }
            merged.put_at_ms = now_ms;

            registry.workers.insert(merged.id.clone(), merged.clone());
            let doc = Document::encode(DOC_TYPE, REGISTRY_DOC_ID, rev, &registry)?;
            match self.storage.put(doc).await? {
                PutOutcome::Stored(_) => return Ok(merged),
                PutOutcome::Conflict(_) | PutOutcome::Deleted => {
                    tracing::debug!(
                        worker = %record.id,
                        attempt,
                        "heartbeat write conflict, re-merging"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(BACKOFF_CAP);
                }
            }
        }
        Err(FleetError::WriteContention { attempts: MAX_PUT_ATTEMPTS })
    }

    /// Remove registry entries matching the predicate; returns the
    /// remaining entries. Administrative operation: on conflict the
    /// registry is re-read and the removal re-applied once, not
    /// looped.
    pub async fn purge<P>(
        &self,
        mut predicate: P,
    ) -> Result<BTreeMap<WorkerId, HeartbeatRecord>, FleetError>
    where
        P: FnMut(&WorkerId, &HeartbeatRecord) -> bool,
    {
        for attempt in 1..=2u32 {
            let (mut registry, rev) = self.registry().await?;
            let removed = registry.remove_where(&mut predicate);
            if removed == 0 {
                return Ok(registry.workers);
            }
            let doc = Document::encode(DOC_TYPE, REGISTRY_DOC_ID, rev, &registry)?;
            match self.storage.put(doc).await? {
                PutOutcome::Stored(_) => {
                    tracing::info!(removed, "purged heartbeat records");
                    return Ok(registry.workers);
                }
                PutOutcome::Conflict(_) | PutOutcome::Deleted => {
                    tracing::debug!(attempt, "purge write conflict, rechecking");
                }
            }
        }
        Err(FleetError::WriteContention { attempts: 2 })
    }

    pub async fn set_desired_state(
        &self,
        desired: Option<LifecycleState>,
    ) -> Result<(), FleetError> {
        self.modify_control(|control| control.desired_state = desired).await
    }

    pub async fn set_coordinating(&self, coordinating: bool) -> Result<(), FleetError> {
        self.modify_control(|control| control.coordinating = coordinating).await
    }

    async fn modify_control<F>(&self, mut mutate: F) -> Result<(), FleetError>
    where
        F: FnMut(&mut FleetControl),
    {
        let mut delay = BACKOFF_BASE;
        for attempt in 1..=MAX_PUT_ATTEMPTS {
            let (mut control, rev) = match self.storage.get(DOC_TYPE, CONTROL_DOC_ID).await? {
                Some(doc) => (doc.decode()?, doc.rev),
                None => (FleetControl::default(), 0),
            };
            mutate(&mut control);
            let doc = Document::encode(DOC_TYPE, CONTROL_DOC_ID, rev, &control)?;
            match self.storage.put(doc).await? {
                PutOutcome::Stored(_) => return Ok(()),
                PutOutcome::Conflict(_) | PutOutcome::Deleted => {
                    tracing::debug!(attempt, "control write conflict, retrying");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(BACKOFF_CAP);
                }
            }
        }
        Err(FleetError::WriteContention { attempts: MAX_PUT_ATTEMPTS })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
