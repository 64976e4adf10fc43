// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only view of a worker reconstructed from its persisted
//! heartbeat record.
//!
//! Operator tooling treats a live [`crate::worker::Worker`] and a
//! recalled record uniformly through the [`WorkerInfo`] trait — an
//! interface value rather than a class hierarchy. A proxy never has
//! message samples, so it only reports whatever aggregates were last
//! persisted.

use muster_core::{HeartbeatRecord, LifecycleState, WorkerId};

/// Identity and state accessors common to live and recalled workers.
pub trait WorkerInfo {
    fn id(&self) -> &WorkerId;
    fn pid(&self) -> u32;
    fn ip(&self) -> Option<&str>;
    fn hostname(&self) -> Option<&str>;
    fn system(&self) -> Option<&str>;
    fn launched_at_ms(&self) -> u64;
    fn state(&self) -> Option<LifecycleState>;
}

/// A recalled worker: pure value object over a persisted record.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerProxy {
    record: HeartbeatRecord,
}

impl WorkerProxy {
    pub fn record(&self) -> &HeartbeatRecord {
        &self.record
    }

    pub fn into_record(self) -> HeartbeatRecord {
        self.record
    }

    /// `put_at >= t`.
    pub fn updated_since(&self, t_ms: u64) -> bool {
        self.record.updated_since(t_ms)
    }

    /// Heartbeated within the last `window_ms` milliseconds.
    pub fn updated_recently(&self, now_ms: u64, window_ms: u64) -> bool {
        self.record.updated_recently(now_ms, window_ms)
    }
}

impl From<HeartbeatRecord> for WorkerProxy {
    fn from(record: HeartbeatRecord) -> Self {
        Self { record }
    }
}

impl WorkerInfo for WorkerProxy {
    fn id(&self) -> &WorkerId {
        &self.record.id
    }

    fn pid(&self) -> u32 {
        self.record.pid
    }

    fn ip(&self) -> Option<&str> {
        self.record.ip.as_deref()
    }

    fn hostname(&self) -> Option<&str> {
        self.record.hostname.as_deref()
    }

    fn system(&self) -> Option<&str> {
        self.record.system.as_deref()
    }

    fn launched_at_ms(&self) -> u64 {
        self.record.launched_at_ms
    }

    fn state(&self) -> Option<LifecycleState> {
        self.record.state
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
