// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-level control plane.
//!
//! The coordinator runs synchronously in the calling process and
//! talks to the fleet only through the shared registry and control
//! documents: broadcast a desired state, poll until the active
//! members converge, and garbage-collect stale records. There is no
//! push notification anywhere — pure bounded polling.

use crate::env;
use crate::error::FleetError;
use crate::proxy::WorkerProxy;
use crate::storage::Storage;
use crate::store::HeartbeatStore;
use muster_core::{Clock, HeartbeatRecord, LifecycleState, WorkerId};
use std::collections::BTreeMap;
use std::time::Duration;

/// Coordinator-wide defaults, overridable per call.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Overall deadline for convergence/refresh waits.
    pub timeout: Duration,
    /// Sleep between registry polls.
    pub poll_interval: Duration,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(5), poll_interval: Duration::from_millis(100) }
    }
}

impl FleetConfig {
    /// Defaults from `MUSTER_FLEET_TIMEOUT_MS` / `MUSTER_POLL_INTERVAL_MS`.
    pub fn from_env() -> Self {
        Self { timeout: env::fleet_timeout(), poll_interval: env::poll_interval() }
    }
}

/// Per-call options for state broadcasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeOptions {
    /// Override the configured convergence timeout.
    pub timeout: Option<Duration>,
}

/// Options for [`FleetCoordinator::stop_all`].
#[derive(Debug, Clone, Copy)]
pub struct StopOptions {
    pub timeout: Option<Duration>,
    /// Reset the desired state to `running` after the stop, so
    /// workers booting later do not start stopped. The reset runs
    /// whether or not the stop converged; its own failure is logged
    /// and swallowed.
    pub reset_to_running: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self { timeout: None, reset_to_running: true }
    }
}

pub struct FleetCoordinator<S, C> {
    store: HeartbeatStore<S, C>,
    config: FleetConfig,
}

impl<S: Storage, C: Clock> FleetCoordinator<S, C> {
    pub fn new(store: HeartbeatStore<S, C>, config: FleetConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &HeartbeatStore<S, C> {
        &self.store
    }

    /// Broadcast `desired` and block until every worker that was
    /// active at invocation reports it, or the timeout fires.
    ///
    /// Workers that appear during convergence are not required to
    /// converge for this call; a record purged mid-wait stops
    /// blocking (nothing will ever update it again). Coordination
    /// mode is disabled on both the success and the timeout path.
    pub async fn change_state(
        &self,
        desired: LifecycleState,
        opts: ChangeOptions,
    ) -> Result<(), FleetError> {
        let timeout = opts.timeout.unwrap_or(self.config.timeout);
        let (registry, _) = self.store.registry().await?;
        let active: Vec<WorkerId> = registry.active_states().into_keys().collect();

        tracing::info!(desired = %desired, active = active.len(), "broadcasting fleet state");
        self.store.set_coordinating(true).await?;
        if let Err(error) = self.store.set_desired_state(Some(desired)).await {
            // Don't leave the fleet in coordination mode behind a
            // broadcast that never happened.
            self.store.set_coordinating(false).await?;
            return Err(error);
        }

        let result = self.await_convergence(&active, desired, timeout).await;
        self.store.set_coordinating(false).await?;
        result
    }

    async fn await_convergence(
        &self,
        active: &[WorkerId],
        desired: LifecycleState,
        timeout: Duration,
    ) -> Result<(), FleetError> {
        let deadline = self.store.clock().now() + timeout;
        loop {
            let (registry, _) = self.store.registry().await?;
            // Last-seen state of every snapshot member still on
            // record. A record purged mid-wait drops out entirely:
            // nothing will ever update it again.
            let states: BTreeMap<WorkerId, Option<LifecycleState>> = active
                .iter()
                .filter_map(|id| registry.workers.get(id).map(|record| (id.clone(), record.state)))
                .collect();
            if states.values().all(|state| *state == Some(desired)) {
                tracing::info!(desired = %desired, "fleet converged");
                return Ok(());
            }
            if self.store.clock().now() >= deadline {
                return Err(FleetError::ConvergenceTimeout {
                    desired,
                    timeout_ms: timeout.as_millis() as u64,
                    states,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Stop the whole fleet, then (by default) reset the desired
    /// state to `running` so late-booting workers do not start
    /// stopped. Returns the stop's outcome; the reset's own failure
    /// is only logged.
    pub async fn stop_all(&self, opts: StopOptions) -> Result<(), FleetError> {
        let stop =
            self.change_state(LifecycleState::Stopped, ChangeOptions { timeout: opts.timeout }).await;
        if opts.reset_to_running {
            let reset = self
                .change_state(LifecycleState::Running, ChangeOptions { timeout: opts.timeout })
                .await;
            if let Err(error) = reset {
                tracing::warn!(error = %error, "post-stop reset to running failed");
            }
        }
        stop
    }

    pub async fn pause_all(&self, opts: ChangeOptions) -> Result<(), FleetError> {
        self.change_state(LifecycleState::Paused, opts).await
    }

    pub async fn unpause_all(&self, opts: ChangeOptions) -> Result<(), FleetError> {
        self.change_state(LifecycleState::Running, opts).await
    }

    /// Poll until every known worker has published a heartbeat no
    /// older than one second before this call began.
    pub async fn refresh_worker_info(&self, opts: ChangeOptions) -> Result<(), FleetError> {
        let timeout = opts.timeout.unwrap_or(self.config.timeout);
        let threshold_ms = self.store.clock().epoch_ms().saturating_sub(1_000);
        let (registry, _) = self.store.registry().await?;
        let known: Vec<WorkerId> = registry.workers.keys().cloned().collect();

        self.store.set_coordinating(true).await?;
        let result = self.await_refresh(&known, threshold_ms, timeout).await;
        self.store.set_coordinating(false).await?;
        result
    }

    async fn await_refresh(
        &self,
        known: &[WorkerId],
        threshold_ms: u64,
        timeout: Duration,
    ) -> Result<(), FleetError> {
        let deadline = self.store.clock().now() + timeout;
        loop {
            let (registry, _) = self.store.registry().await?;
            let stale: Vec<WorkerId> = known
                .iter()
                .filter(|id| {
                    registry
                        .workers
                        .get(*id)
                        .is_some_and(|record| !record.updated_since(threshold_ms))
                })
                .cloned()
                .collect();
            if stale.is_empty() {
                return Ok(());
            }
            if self.store.clock().now() >= deadline {
                return Err(FleetError::RefreshTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                    stale,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// All known workers as read-only proxies.
    pub async fn workers(&self) -> Result<Vec<WorkerProxy>, FleetError> {
        let (registry, _) = self.store.registry().await?;
        Ok(registry.workers.into_values().map(WorkerProxy::from).collect())
    }

    /// Single worker by id.
    pub async fn worker(&self, id: &WorkerId) -> Result<Option<WorkerProxy>, FleetError> {
        let (registry, _) = self.store.registry().await?;
        Ok(registry.workers.get(id).cloned().map(WorkerProxy::from))
    }

    /// Workers whose record matches an arbitrary predicate.
    pub async fn filter<P>(&self, mut predicate: P) -> Result<Vec<WorkerProxy>, FleetError>
    where
        P: FnMut(&WorkerId, &HeartbeatRecord) -> bool,
    {
        let (registry, _) = self.store.registry().await?;
        Ok(registry
            .workers
            .into_iter()
            .filter(|(id, record)| predicate(id, record))
            .map(|(_, record)| WorkerProxy::from(record))
            .collect())
    }

    /// Workers whose serialized record matches every `(field, value)`
    /// pair exactly.
    pub async fn find_by(
        &self,
        criteria: &[(&str, serde_json::Value)],
    ) -> Result<Vec<WorkerProxy>, FleetError> {
        let (registry, _) = self.store.registry().await?;
        let mut matches = Vec::new();
        for record in registry.workers.into_values() {
            let value = serde_json::to_value(&record)?;
            let hit = criteria.iter().all(|(field, expected)| {
                value.get(*field).is_some_and(|actual| actual == expected)
            });
            if hit {
                matches.push(WorkerProxy::from(record));
            }
        }
        Ok(matches)
    }

    /// States of all active members (non-nil, not stopped).
    pub async fn active_worker_states(
        &self,
    ) -> Result<BTreeMap<WorkerId, LifecycleState>, FleetError> {
        let (registry, _) = self.store.registry().await?;
        Ok(registry.active_states())
    }

    /// Remove entries matching the predicate; returns the remaining
    /// entries.
    pub async fn purge<P>(
        &self,
        predicate: P,
    ) -> Result<BTreeMap<WorkerId, HeartbeatRecord>, FleetError>
    where
        P: FnMut(&WorkerId, &HeartbeatRecord) -> bool,
    {
        self.store.purge(predicate).await
    }

    /// Forget a single worker by id.
    pub async fn forget_worker(
        &self,
        id: &WorkerId,
    ) -> Result<BTreeMap<WorkerId, HeartbeatRecord>, FleetError> {
        self.store.purge(|wid, _| wid == id).await
    }

    /// Garbage-collect records whose worker is presumed dead (state
    /// nil or stopped). Runs a second pass to catch entries that
    /// became eligible during the first; exactly one extra pass, no
    /// fixed-point loop.
    pub async fn purge_stale_worker_info(
        &self,
    ) -> Result<BTreeMap<WorkerId, HeartbeatRecord>, FleetError> {
        self.store.purge(|_, record| record.is_stale()).await?;
        self.store.purge(|_, record| record.is_stale()).await
    }

    /// Poll until the worker has heartbeated at or after `since_ms`
    /// (default: one timeout window before now). A timeout is
    /// swallowed into `false`, never raised.
    pub async fn responding(
        &self,
        id: &WorkerId,
        since_ms: Option<u64>,
    ) -> Result<bool, FleetError> {
        let since_ms = since_ms.unwrap_or_else(|| {
            self.store.clock().epoch_ms().saturating_sub(self.config.timeout.as_millis() as u64)
        });

        self.store.set_coordinating(true).await?;
        let deadline = self.store.clock().now() + self.config.timeout;
        let alive = loop {
            let (registry, _) = self.store.registry().await?;
            if registry.workers.get(id).is_some_and(|record| record.updated_since(since_ms)) {
                break true;
            }
            if self.store.clock().now() >= deadline {
                break false;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        };
        self.store.set_coordinating(false).await?;
        Ok(alive)
    }

    /// A worker is stalling when it stops publishing heartbeats.
    pub async fn stalling(&self, id: &WorkerId) -> Result<bool, FleetError> {
        Ok(!self.responding(id, None).await?)
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
