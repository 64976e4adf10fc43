// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muster-fleet: the coordination layer.
//!
//! Workers heartbeat into one shared registry document; the fleet
//! coordinator broadcasts a desired lifecycle state and polls the
//! registry until the fleet converges. All cross-process coordination
//! rides on the [`storage::Storage`] document abstraction — there is
//! no worker-to-worker transport.

pub mod coordinator;
pub mod env;
pub mod error;
pub mod lookup;
pub mod proxy;
pub mod storage;
pub mod store;
pub mod worker;

pub use coordinator::{ChangeOptions, FleetConfig, FleetCoordinator, StopOptions};
pub use error::FleetError;
pub use lookup::WorkerLookup;
pub use proxy::{WorkerInfo, WorkerProxy};
pub use storage::{Document, FsStorage, MemoryStorage, PutOutcome, Storage, StorageError};
pub use store::HeartbeatStore;
pub use worker::{CompletedUnit, WorkSource, Worker};
