// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! muster-core: leaf types for the Muster fleet coordination layer.
//!
//! No I/O lives here. Worker identity, lifecycle state, the heartbeat
//! record with its sliding-window metrics, and the clock seam used by
//! everything above.

pub mod clock;
pub mod identity;
pub mod record;
pub mod state;
pub mod worker_id;

pub use clock::{Clock, FakeClock, SystemClock};
pub use identity::WorkerIdentity;
pub use record::{
    FleetControl, HeartbeatRecord, HeartbeatRegistry, MessageSample, SampleWindow,
    WindowAggregates, HOUR_MS, MINUTE_MS,
};
pub use state::{LifecycleState, ParseStateError};
pub use worker_id::WorkerId;
