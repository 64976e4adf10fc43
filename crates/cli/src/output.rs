// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text rendering for operator output.

use muster_core::LifecycleState;
use muster_fleet::{WorkerInfo, WorkerProxy};

/// Compact elapsed-time formatting: "42s", "3m12s", "2h05m".
pub fn format_elapsed_secs(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

fn state_label(state: Option<LifecycleState>) -> &'static str {
    match state {
        Some(LifecycleState::Running) => "running",
        Some(LifecycleState::Paused) => "paused",
        Some(LifecycleState::Stopped) => "stopped",
        None => "unknown",
    }
}

/// Render the `muster status` table.
pub fn render_status(proxies: &[WorkerProxy], now_ms: u64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:<16} {:>7} {:<8} {:>8} {:>9} {:>10}\n",
        "ID", "HOST", "PID", "STATE", "UPTIME", "PROC/MIN", "LAST SEEN"
    ));
    for proxy in proxies {
        let record = proxy.record();
        let last_seen = now_ms.saturating_sub(record.put_at_ms) / 1000;
        out.push_str(&format!(
            "{:<24} {:<16} {:>7} {:<8} {:>8} {:>9} {:>10}\n",
            record.id.as_str(),
            proxy.hostname().unwrap_or("-"),
            record.pid,
            state_label(record.state),
            format_elapsed_secs(record.uptime_secs),
            record.processed_last_minute,
            format!("{} ago", format_elapsed_secs(last_seen)),
        ));
    }
    if proxies.is_empty() {
        out.push_str("(no workers registered)\n");
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
