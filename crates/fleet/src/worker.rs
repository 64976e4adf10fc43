// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The live worker: owns an identity, a local lifecycle state, and
//! the message-sample ring; heartbeats into the shared registry.
//!
//! Work itself is delegated to the external engine through the
//! [`WorkSource`] hook. This layer only wraps the engine's
//! "determine next action" step to inject heartbeat-on-transition
//! behavior when the fleet is being actively coordinated.

use crate::error::FleetError;
use crate::proxy::WorkerInfo;
use crate::storage::Storage;
use crate::store::HeartbeatStore;
use muster_core::{
    Clock, HeartbeatRecord, LifecycleState, MessageSample, SampleWindow, WorkerId, WorkerIdentity,
};
use async_trait::async_trait;

/// A unit of work the external engine completed on our behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedUnit {
    /// How long the unit waited before being picked up.
    pub wait_time_ms: u64,
}

/// Narrow interface to the external engine's work loop.
#[async_trait]
pub trait WorkSource: Send {
    /// Perform at most one unit of work; `None` when idle.
    async fn next(&mut self) -> Option<CompletedUnit>;
}

pub struct Worker<S, C> {
    identity: WorkerIdentity,
    state: LifecycleState,
    samples: SampleWindow,
    store: HeartbeatStore<S, C>,
    /// Uptime frozen at its final value once stopped.
    final_uptime_secs: Option<u64>,
    shut_down: bool,
}

impl<S: Storage, C: Clock> Worker<S, C> {
    /// Start a worker: capture identity, adopt the fleet-wide desired
    /// state if one is already set (else `running`), and publish the
    /// initial heartbeat.
    pub async fn start(store: HeartbeatStore<S, C>) -> Result<Self, FleetError> {
        let now_ms = store.clock().epoch_ms();
        let identity = WorkerIdentity::capture(now_ms);
        let state = store.desired_state().await?.unwrap_or(LifecycleState::Running);

        let mut worker = Self {
            identity,
            state,
            samples: SampleWindow::new(),
            store,
            final_uptime_secs: None,
            shut_down: false,
        };
        if state == LifecycleState::Stopped {
            worker.final_uptime_secs = Some(0);
        }
        worker.heartbeat().await?;
        tracing::info!(worker = %worker.identity.id, state = %state, "worker started");
        Ok(worker)
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    pub fn current_state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Record a completed unit of work in the local sample ring.
    pub fn record_message(&mut self, wait_time_ms: u64) {
        self.samples.record(MessageSample {
            processed_at_ms: self.store.clock().epoch_ms(),
            wait_time_ms,
        });
    }

    /// One pass of the run loop.
    ///
    /// When coordination mode is enabled, re-evaluate the local state
    /// against the fleet-wide desired state and republish the
    /// heartbeat — this is what lets the coordinator observe
    /// convergence. When disabled, no heartbeat is forced (only
    /// start/shutdown write), so unmanaged fleets do not churn
    /// storage on every tick.
    pub async fn step<W: WorkSource>(
        &mut self,
        source: &mut W,
    ) -> Result<LifecycleState, FleetError> {
        if self.shut_down {
            return Ok(LifecycleState::Stopped);
        }

        let control = self.store.control().await?;
        if control.coordinating {
            if let Some(desired) = control.desired_state {
                if desired != self.state {
                    tracing::info!(
                        worker = %self.identity.id,
                        from = %self.state,
                        to = %desired,
                        "adopting fleet desired state"
                    );
                    self.transition(desired);
                }
            }
            self.heartbeat().await?;
        }

        if self.state == LifecycleState::Running {
            if let Some(unit) = source.next().await {
                self.record_message(unit.wait_time_ms);
            }
        }
        Ok(self.state)
    }

    /// Publish the current heartbeat record, recomputing the window
    /// aggregates from the local samples.
    pub async fn heartbeat(&mut self) -> Result<(), FleetError> {
        let record = self.snapshot_record();
        self.store.save_record(&record, Some(&mut self.samples)).await?;
        Ok(())
    }

    /// Stop this worker and publish the final heartbeat. Idempotent:
    /// a second call neither errors nor writes again.
    pub async fn shutdown(&mut self) -> Result<(), FleetError> {
        if self.shut_down {
            return Ok(());
        }
        self.transition(LifecycleState::Stopped);
        self.heartbeat().await?;
        self.shut_down = true;
        tracing::info!(
            worker = %self.identity.id,
            uptime_secs = self.final_uptime_secs.unwrap_or(0),
            "worker shut down"
        );
        Ok(())
    }

    fn transition(&mut self, to: LifecycleState) {
        self.state = to;
        if to == LifecycleState::Stopped {
            if self.final_uptime_secs.is_none() {
                self.final_uptime_secs = Some(self.live_uptime_secs());
            }
        } else {
            self.final_uptime_secs = None;
        }
    }

    fn live_uptime_secs(&self) -> u64 {
        self.store.clock().epoch_ms().saturating_sub(self.identity.launched_at_ms) / 1000
    }

    fn snapshot_record(&self) -> HeartbeatRecord {
        let mut record = HeartbeatRecord::new(&self.identity, self.state);
        record.uptime_secs = self.final_uptime_secs.unwrap_or_else(|| self.live_uptime_secs());
        record
    }
}

impl<S, C> WorkerInfo for Worker<S, C> {
    fn id(&self) -> &WorkerId {
        &self.identity.id
    }

    fn pid(&self) -> u32 {
        self.identity.pid
    }

    fn ip(&self) -> Option<&str> {
        self.identity.ip.as_deref()
    }

    fn hostname(&self) -> Option<&str> {
        self.identity.hostname.as_deref()
    }

    fn system(&self) -> Option<&str> {
        self.identity.system.as_deref()
    }

    fn launched_at_ms(&self) -> u64 {
        self.identity.launched_at_ms
    }

    fn state(&self) -> Option<LifecycleState> {
        Some(self.state)
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
