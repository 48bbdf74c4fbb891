// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_selection_has_no_resume_hint() {
    let sel = RunnerSelection::new("i1", RunnerType::Claude);
    assert_eq!(sel.resume_session_id, None);
}

#[test]
fn with_resume_sets_hint() {
    let sel = RunnerSelection::new("i1", RunnerType::Claude).with_resume("sess-abc");
    assert_eq!(sel.resume_session_id.as_deref(), Some("sess-abc"));
}

#[test]
fn runner_type_display() {
    assert_eq!(RunnerType::Opencode.to_string(), "opencode");
    assert_eq!(RunnerType::Mock.to_string(), "mock");
}

#[test]
fn serde_round_trip() {
    let sel = RunnerSelection::new("i1", RunnerType::Gemini).with_resume("r1");
    let json = serde_json::to_string(&sel).unwrap();
    let back: RunnerSelection = serde_json::from_str(&json).unwrap();
    assert_eq!(sel, back);
}
