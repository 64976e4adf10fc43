// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the fleet crate.

use crate::error::FleetError;
use std::path::PathBuf;
use std::time::Duration;

/// Default convergence/refresh timeout (`MUSTER_FLEET_TIMEOUT_MS`).
pub fn fleet_timeout() -> Duration {
    std::env::var("MUSTER_FLEET_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Poll interval for convergence/refresh waits (`MUSTER_POLL_INTERVAL_MS`).
pub fn poll_interval() -> Duration {
    std::env::var("MUSTER_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(100))
}

/// Resolve state directory: MUSTER_STATE_DIR > XDG_STATE_HOME/muster > ~/.local/state/muster
pub fn state_dir() -> Result<PathBuf, FleetError> {
    if let Ok(dir) = std::env::var("MUSTER_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("muster"));
    }
    let home = std::env::var("HOME").map_err(|_| FleetError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/muster"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
