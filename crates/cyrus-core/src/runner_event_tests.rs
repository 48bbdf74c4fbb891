// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn final_event_is_final() {
    let ev = RunnerEvent::Final { text: "done".into() };
    assert!(ev.is_final());
}

#[test]
fn thought_is_not_final() {
    assert!(!RunnerEvent::Thought { text: "thinking".into() }.is_final());
}

#[test]
fn action_and_result_expose_tool_use_id() {
    let action = RunnerEvent::Action {
        name: "Read".into(),
        detail: Some("src/lib.rs".into()),
        tool_use_id: "tu1".into(),
    };
    assert_eq!(action.tool_use_id(), Some("tu1"));

    let result = RunnerEvent::Result { tool_use_id: "tu1".into(), output: "ok".into(), is_error: false };
    assert_eq!(result.tool_use_id(), Some("tu1"));
}

#[test]
fn thought_has_no_tool_use_id() {
    assert_eq!(RunnerEvent::Thought { text: "x".into() }.tool_use_id(), None);
}

#[test]
fn serde_tag_round_trips() {
    let ev = RunnerEvent::Error { err: "boom".into() };
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["kind"], "Error");
    let back: RunnerEvent = serde_json::from_value(json).unwrap();
    assert_eq!(ev, back);
}
