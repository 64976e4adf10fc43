// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable facts about a running worker process.
//!
//! All host probes are best-effort: a worker must be able to start on
//! a box where the hostname or a routable address cannot be
//! determined, so failures degrade to `None` instead of erroring.

use crate::worker_id::WorkerId;
use serde::{Deserialize, Serialize};
use std::net::UdpSocket;

/// Identity of a worker process, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    pub id: WorkerId,
    pub pid: u32,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub system: Option<String>,
    /// Epoch milliseconds when the worker process launched.
    pub launched_at_ms: u64,
}

impl WorkerIdentity {
    /// Capture the identity of the current process.
    pub fn capture(launched_at_ms: u64) -> Self {
        Self {
            id: WorkerId::generate(),
            pid: std::process::id(),
            ip: local_ip(),
            hostname: hostname(),
            system: Some(format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)),
            launched_at_ms,
        }
    }
}

fn hostname() -> Option<String> {
    nix::unistd::gethostname().ok().and_then(|h| h.into_string().ok())
}

/// Best-effort outbound address. Connecting a UDP socket never sends
/// a packet; it only asks the kernel which local address would route.
fn local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("10.255.255.255:1").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
