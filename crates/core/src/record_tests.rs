// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn identity(id: &str) -> WorkerIdentity {
    WorkerIdentity {
        id: WorkerId::from_string(id),
        pid: 4242,
        ip: Some("192.168.1.7".to_string()),
        hostname: Some("box-a".to_string()),
        system: Some("linux x86_64".to_string()),
        launched_at_ms: 1_000_000,
    }
}

fn sample(processed_at_ms: u64, wait_time_ms: u64) -> MessageSample {
    MessageSample { processed_at_ms, wait_time_ms }
}

#[test]
fn window_counts_only_samples_in_range() {
    let now = 10 * HOUR_MS;
    let mut window = SampleWindow::new();
    // Older than an hour: excluded from both windows.
    window.record(sample(now - HOUR_MS - 1, 500));
    // Within the hour but not the minute.
    window.record(sample(now - 30 * MINUTE_MS, 300));
    window.record(sample(now - 2 * MINUTE_MS, 100));
    // Within the minute.
    window.record(sample(now - 30_000, 40));
    window.record(sample(now - 1_000, 60));

    let agg = window.aggregates(now);
    assert_eq!(agg.processed_last_minute, 2);
    assert_eq!(agg.wait_time_last_minute_ms, 50.0);
    assert_eq!(agg.processed_last_hour, 4);
    assert_eq!(agg.wait_time_last_hour_ms, 125.0);
}

#[test]
fn empty_window_divides_by_one() {
    let window = SampleWindow::new();
    let agg = window.aggregates(5 * HOUR_MS);
    assert_eq!(agg.processed_last_minute, 0);
    assert_eq!(agg.wait_time_last_minute_ms, 0.0);
    assert_eq!(agg.processed_last_hour, 0);
    assert_eq!(agg.wait_time_last_hour_ms, 0.0);
}

#[test]
fn prune_evicts_by_age() {
    let now = 3 * HOUR_MS;
    let mut window = SampleWindow::new();
    window.record(sample(now - 2 * HOUR_MS, 10));
    window.record(sample(now - HOUR_MS - 1, 10));
    window.record(sample(now - 10 * MINUTE_MS, 10));
    window.record(sample(now, 10));

    window.prune(now);
    assert_eq!(window.len(), 2);
}

#[test]
fn boundary_sample_exactly_one_hour_old_is_kept() {
    let now = 2 * HOUR_MS;
    let mut window = SampleWindow::new();
    window.record(sample(now - HOUR_MS, 80));
    window.prune(now);
    assert_eq!(window.len(), 1);
    assert_eq!(window.aggregates(now).processed_last_hour, 1);
}

#[test]
fn record_new_copies_identity() {
    let identity = identity("wkr-rec");
    let record = HeartbeatRecord::new(&identity, LifecycleState::Running);
    assert_eq!(record.id, identity.id);
    assert_eq!(record.pid, 4242);
    assert_eq!(record.hostname.as_deref(), Some("box-a"));
    assert_eq!(record.state, Some(LifecycleState::Running));
    assert_eq!(record.launched_at_ms, 1_000_000);
}

#[test]
fn carry_metrics_preserves_previous_aggregates() {
    let id = identity("wkr-carry");
    let mut previous = HeartbeatRecord::new(&id, LifecycleState::Running);
    previous.apply_aggregates(&WindowAggregates {
        processed_last_minute: 7,
        wait_time_last_minute_ms: 12.5,
        processed_last_hour: 90,
        wait_time_last_hour_ms: 33.0,
    });

    let mut fresh = HeartbeatRecord::new(&id, LifecycleState::Paused);
    fresh.carry_metrics_from(&previous);
    assert_eq!(fresh.processed_last_minute, 7);
    assert_eq!(fresh.wait_time_last_minute_ms, 12.5);
    assert_eq!(fresh.processed_last_hour, 90);
    assert_eq!(fresh.wait_time_last_hour_ms, 33.0);
    // State is still the fresh write's state.
    assert_eq!(fresh.state, Some(LifecycleState::Paused));
}

#[yare::parameterized(
    running   = { Some(LifecycleState::Running), false },
    paused    = { Some(LifecycleState::Paused), false },
    stopped   = { Some(LifecycleState::Stopped), true },
    unknown   = { None, true },
)]
fn staleness_by_state(state: Option<LifecycleState>, stale: bool) {
    let mut record = HeartbeatRecord::new(&identity("wkr-s"), LifecycleState::Running);
    record.state = state;
    assert_eq!(record.is_stale(), stale);
    assert_eq!(record.is_active(), !stale);
}

#[test]
fn updated_since_compares_put_at() {
    let mut record = HeartbeatRecord::new(&identity("wkr-t"), LifecycleState::Running);
    record.put_at_ms = 5_000;
    assert!(record.updated_since(5_000));
    assert!(record.updated_since(4_999));
    assert!(!record.updated_since(5_001));
    assert!(record.updated_recently(6_000, 1_000));
    assert!(!record.updated_recently(7_000, 1_000));
}

#[test]
fn registry_active_states_skips_stopped_and_unknown() {
    let mut registry = HeartbeatRegistry::default();
    let a = HeartbeatRecord::new(&identity("wkr-a"), LifecycleState::Running);
    let mut b = HeartbeatRecord::new(&identity("wkr-b"), LifecycleState::Stopped);
    b.state = Some(LifecycleState::Stopped);
    let mut c = HeartbeatRecord::new(&identity("wkr-c"), LifecycleState::Running);
    c.state = None;
    registry.workers.insert(a.id.clone(), a);
    registry.workers.insert(b.id.clone(), b);
    registry.workers.insert(c.id.clone(), c);

    let active = registry.active_states();
    assert_eq!(active.len(), 1);
    assert_eq!(active.get("wkr-a").copied(), Some(LifecycleState::Running));
}

#[test]
fn registry_remove_where_reports_count() {
    let mut registry = HeartbeatRegistry::default();
    for name in ["wkr-1", "wkr-2", "wkr-3"] {
        let record = HeartbeatRecord::new(&identity(name), LifecycleState::Running);
        registry.workers.insert(record.id.clone(), record);
    }
    let removed = registry.remove_where(|id, _| id.as_str() != "wkr-2");
    assert_eq!(removed, 2);
    assert!(registry.workers.contains_key("wkr-2"));
}

#[test]
fn registry_serde_round_trip() {
    let mut registry = HeartbeatRegistry::default();
    let mut record = HeartbeatRecord::new(&identity("wkr-rt"), LifecycleState::Paused);
    record.put_at_ms = 42;
    record.uptime_secs = 17;
    registry.workers.insert(record.id.clone(), record);

    let json = serde_json::to_string(&registry).unwrap();
    let back: HeartbeatRegistry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, registry);
}

#[test]
fn fleet_control_defaults_to_uncoordinated() {
    let control = FleetControl::default();
    assert_eq!(control.desired_state, None);
    assert!(!control.coordinating);
}
