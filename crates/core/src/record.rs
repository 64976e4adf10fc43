// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat record, sliding-window metrics, and the shared registry
//! and control documents.
//!
//! A `HeartbeatRecord` is owned by exactly one worker but readable
//! (and removable) by the fleet coordinator. `MessageSample`s are
//! worker-local and never persisted; only the window aggregates
//! derived from them at heartbeat time are written out.

use crate::identity::WorkerIdentity;
use crate::state::LifecycleState;
use crate::worker_id::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// One minute, in epoch milliseconds.
pub const MINUTE_MS: u64 = 60 * 1000;
/// One hour, in epoch milliseconds. Also the sample retention bound.
pub const HOUR_MS: u64 = 60 * MINUTE_MS;

/// A completed unit of work, as observed by the owning worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSample {
    /// Epoch ms when the unit finished processing.
    pub processed_at_ms: u64,
    /// How long the unit waited before being picked up.
    pub wait_time_ms: u64,
}

/// Aggregates over the minute and hour windows, computed at heartbeat
/// write time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowAggregates {
    pub processed_last_minute: u64,
    pub wait_time_last_minute_ms: f64,
    pub processed_last_hour: u64,
    pub wait_time_last_hour_ms: f64,
}

/// Ring of recent message samples, retained up to one hour.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    samples: VecDeque<MessageSample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed unit of work.
    pub fn record(&mut self, sample: MessageSample) {
        self.samples.push_back(sample);
    }

    /// Evict samples older than one hour. Called on every heartbeat
    /// write so the ring never grows past an hour of traffic.
    pub fn prune(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(HOUR_MS);
        // Samples arrive in processed order; stop at the first keeper.
        while let Some(front) = self.samples.front() {
            if front.processed_at_ms < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Count and mean wait time over the minute and hour windows.
    ///
    /// An empty window divides by 1, not 0, so the mean degrades to
    /// 0.0 instead of NaN.
    pub fn aggregates(&self, now_ms: u64) -> WindowAggregates {
        let minute_cutoff = now_ms.saturating_sub(MINUTE_MS);
        let hour_cutoff = now_ms.saturating_sub(HOUR_MS);

        let mut minute_count: u64 = 0;
        let mut minute_wait: u64 = 0;
        let mut hour_count: u64 = 0;
        let mut hour_wait: u64 = 0;

        for sample in &self.samples {
            if sample.processed_at_ms >= hour_cutoff && sample.processed_at_ms <= now_ms {
                hour_count += 1;
                hour_wait += sample.wait_time_ms;
                if sample.processed_at_ms >= minute_cutoff {
                    minute_count += 1;
                    minute_wait += sample.wait_time_ms;
                }
            }
        }

        WindowAggregates {
            processed_last_minute: minute_count,
            wait_time_last_minute_ms: minute_wait as f64 / minute_count.max(1) as f64,
            processed_last_hour: hour_count,
            wait_time_last_hour_ms: hour_wait as f64 / hour_count.max(1) as f64,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-worker heartbeat document, keyed by worker id in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub id: WorkerId,
    pub pid: u32,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub system: Option<String>,
    pub launched_at_ms: u64,
    /// None means the worker never progressed past an unknown state;
    /// such records are eligible for garbage collection.
    pub state: Option<LifecycleState>,
    /// Epoch ms of the last successful write. The liveness signal.
    pub put_at_ms: u64,
    /// Seconds since launch; frozen at its final value once stopped.
    pub uptime_secs: u64,
    pub processed_last_minute: u64,
    pub wait_time_last_minute_ms: f64,
    pub processed_last_hour: u64,
    pub wait_time_last_hour_ms: f64,
}

impl HeartbeatRecord {
    /// Fresh record for a worker that has not heartbeated yet.
    pub fn new(identity: &WorkerIdentity, state: LifecycleState) -> Self {
        Self {
            id: identity.id.clone(),
            pid: identity.pid,
            ip: identity.ip.clone(),
            hostname: identity.hostname.clone(),
            system: identity.system.clone(),
            launched_at_ms: identity.launched_at_ms,
            state: Some(state),
            put_at_ms: 0,
            uptime_secs: 0,
            processed_last_minute: 0,
            wait_time_last_minute_ms: 0.0,
            processed_last_hour: 0,
            wait_time_last_hour_ms: 0.0,
        }
    }

    /// Overwrite the window aggregates. Only the owning worker, which
    /// holds the samples, ever recomputes these.
    pub fn apply_aggregates(&mut self, agg: &WindowAggregates) {
        self.processed_last_minute = agg.processed_last_minute;
        self.wait_time_last_minute_ms = agg.wait_time_last_minute_ms;
        self.processed_last_hour = agg.processed_last_hour;
        self.wait_time_last_hour_ms = agg.wait_time_last_hour_ms;
    }

    /// Carry forward metrics from a previously stored record. Used
    /// when a write has no samples to recompute from, so concurrent
    /// readers keep seeing the last real aggregates.
    pub fn carry_metrics_from(&mut self, previous: &HeartbeatRecord) {
        self.processed_last_minute = previous.processed_last_minute;
        self.wait_time_last_minute_ms = previous.wait_time_last_minute_ms;
        self.processed_last_hour = previous.processed_last_hour;
        self.wait_time_last_hour_ms = previous.wait_time_last_hour_ms;
    }

    /// True if the record's worker is presumed dead: never reported a
    /// state, or cleanly stopped.
    pub fn is_stale(&self) -> bool {
        match self.state {
            None => true,
            Some(LifecycleState::Stopped) => true,
            Some(_) => false,
        }
    }

    /// True if the record counts as an active fleet member: state is
    /// known and not stopped.
    pub fn is_active(&self) -> bool {
        !self.is_stale()
    }

    /// `put_at >= t`.
    pub fn updated_since(&self, t_ms: u64) -> bool {
        self.put_at_ms >= t_ms
    }

    /// Heartbeated within the last `window_ms` milliseconds.
    pub fn updated_recently(&self, now_ms: u64, window_ms: u64) -> bool {
        self.updated_since(now_ms.saturating_sub(window_ms))
    }
}

/// The single shared registry document: one entry per known worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRegistry {
    pub workers: BTreeMap<WorkerId, HeartbeatRecord>,
}

impl HeartbeatRegistry {
    /// States of all active members, for convergence checks and
    /// diagnostic snapshots.
    pub fn active_states(&self) -> BTreeMap<WorkerId, LifecycleState> {
        self.workers
            .iter()
            .filter_map(|(id, record)| {
                record.state.filter(|s| *s != LifecycleState::Stopped).map(|s| (id.clone(), s))
            })
            .collect()
    }

    /// Remove entries matching the predicate; returns how many were
    /// dropped.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&WorkerId, &HeartbeatRecord) -> bool,
    {
        let before = self.workers.len();
        self.workers.retain(|id, record| !predicate(id, record));
        before - self.workers.len()
    }
}

/// The fleet-wide control document: desired lifecycle state plus the
/// coordination-mode flag that makes workers heartbeat on every tick.
/// Storage-backed because coordinators and workers run in different
/// processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetControl {
    pub desired_state: Option<LifecycleState>,
    pub coordinating: bool,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
