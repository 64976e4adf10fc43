// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    running = { LifecycleState::Running, "running" },
    paused  = { LifecycleState::Paused, "paused" },
    stopped = { LifecycleState::Stopped, "stopped" },
)]
fn display_and_parse_round_trip(state: LifecycleState, text: &str) {
    assert_eq!(state.to_string(), text);
    assert_eq!(text.parse::<LifecycleState>().unwrap(), state);
}

#[test]
fn serializes_lowercase() {
    let json = serde_json::to_string(&LifecycleState::Paused).unwrap();
    assert_eq!(json, "\"paused\"");
}

#[test]
fn parse_rejects_unknown() {
    let err = "zombie".parse::<LifecycleState>().unwrap_err();
    assert_eq!(err, ParseStateError("zombie".to_string()));
}
