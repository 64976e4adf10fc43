// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convenience accessor from a worker id to its latest published
//! attributes.
//!
//! Every call re-reads the registry — a lookup result is never cached
//! across calls, so operators always see the latest heartbeat.

use crate::error::FleetError;
use crate::proxy::WorkerProxy;
use crate::storage::Storage;
use crate::store::HeartbeatStore;
use muster_core::{Clock, WorkerId};

pub struct WorkerLookup<S, C> {
    store: HeartbeatStore<S, C>,
}

impl<S: Storage, C: Clock> WorkerLookup<S, C> {
    pub fn new(store: HeartbeatStore<S, C>) -> Self {
        Self { store }
    }

    /// The worker's current proxy, or `UnknownWorker`.
    pub async fn proxy(&self, id: &WorkerId) -> Result<WorkerProxy, FleetError> {
        let (registry, _) = self.store.registry().await?;
        registry
            .workers
            .get(id)
            .cloned()
            .map(WorkerProxy::from)
            .ok_or_else(|| FleetError::UnknownWorker(id.clone()))
    }

    /// Dynamic access to any field present in the persisted record.
    ///
    /// A field the record does not have is `NoSuchField`; a field
    /// that is present but null comes back as `Value::Null`.
    pub async fn attr(&self, id: &WorkerId, field: &str) -> Result<serde_json::Value, FleetError> {
        let proxy = self.proxy(id).await?;
        let value = serde_json::to_value(proxy.record())?;
        match value.get(field) {
            Some(found) => Ok(found.clone()),
            None => {
                Err(FleetError::NoSuchField { worker: id.clone(), field: field.to_string() })
            }
        }
    }

    /// Explicit accessor for the `system` descriptor.
    pub async fn system_info(&self, id: &WorkerId) -> Result<Option<String>, FleetError> {
        let proxy = self.proxy(id).await?;
        Ok(proxy.record().system.clone())
    }
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
