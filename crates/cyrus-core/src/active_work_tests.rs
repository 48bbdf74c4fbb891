// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_status_is_not_working() {
    let status = ActiveWorkStatus::empty(42);
    assert!(!status.is_working);
    assert!(status.active_sessions.is_empty());
    assert_eq!(status.last_updated, 42);
}

#[test]
fn from_sessions_marks_working_when_non_empty() {
    let summary = ActiveSessionSummary {
        issue_id: "i1".into(),
        issue_identifier: "ENG-1".into(),
        repository_id: "r1".into(),
        started_at: 100,
    };
    let status = ActiveWorkStatus::from_sessions([("sess-1".to_string(), summary)], 200);
    assert!(status.is_working);
    assert_eq!(status.active_sessions.len(), 1);
    assert_eq!(status.last_updated, 200);
}

#[test]
fn serde_round_trip() {
    let status = ActiveWorkStatus::empty(1);
    let json = serde_json::to_string(&status).unwrap();
    let back: ActiveWorkStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(status, back);
}
