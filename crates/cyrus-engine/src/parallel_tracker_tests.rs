// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cyrus_core::RunnerEvent;
use std::collections::HashMap;

fn task(tool_use_id: &str, description: &str) -> RunnerEvent {
    RunnerEvent::Action { name: "Task".into(), detail: Some(description.into()), tool_use_id: tool_use_id.into() }
}

fn action(tool_use_id: &str, name: &str, detail: &str) -> RunnerEvent {
    RunnerEvent::Action { name: name.into(), detail: Some(detail.into()), tool_use_id: tool_use_id.into() }
}

fn result(tool_use_id: &str, output: &str) -> RunnerEvent {
    RunnerEvent::Result { tool_use_id: tool_use_id.into(), output: output.into(), is_error: false }
}

#[test]
fn a_single_task_call_never_forms_a_group() {
    let mut tracker = ParallelTaskTracker::new();
    let mut groups = HashMap::new();

    let fold = tracker.observe(&task("t1", "agent one"), &mut groups, 1000);
    assert_eq!(fold, Fold::Unaffected);
    assert!(groups.is_empty());

    let fold = tracker.observe(&result("t1", "done"), &mut groups, 1001);
    assert_eq!(fold, Fold::Unaffected);
}

#[test]
fn scenario_c_fan_out_consolidation() {
    let mut tracker = ParallelTaskTracker::new();
    let mut groups = HashMap::new();

    tracker.observe(&task("t1", "agent one"), &mut groups, 1000);
    let fold = tracker.observe(&task("t2", "agent two"), &mut groups, 1000);
    let Fold::Ephemeral { group_id, rendered } = fold else { panic!("expected ephemeral fold") };
    assert_eq!(groups.len(), 1);
    assert!(rendered.starts_with("Running 0 of 2 agents…"));

    let fold = tracker.observe(&task("t3", "agent three"), &mut groups, 1000);
    let Fold::Ephemeral { group_id: same_group, rendered } = fold else { panic!("expected ephemeral fold") };
    assert_eq!(same_group, group_id);
    assert!(rendered.starts_with("Running 0 of 3 agents…"));

    let fold = tracker.observe(&action("t1", "Read", "src/lib.rs"), &mut groups, 1000);
    assert!(matches!(fold, Fold::Ephemeral { group_id: g, .. } if g == group_id));

    tracker.observe(&result("t1", "ok"), &mut groups, 1001);
    tracker.observe(&result("t2", "ok"), &mut groups, 1001);
    let fold = tracker.observe(&result("t3", "ok"), &mut groups, 1001);
    match fold {
        Fold::Completed { group_id: completed, rendered } => {
            assert_eq!(completed, group_id);
            assert!(rendered.starts_with("Completed 3 agents"));
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert!(groups.is_empty(), "group must be removed once every member completes");
}

#[test]
fn at_most_one_ephemeral_activity_for_the_group_regardless_of_update_count() {
    let mut tracker = ParallelTaskTracker::new();
    let mut groups = HashMap::new();
    tracker.observe(&task("t1", "a"), &mut groups, 1000);
    tracker.observe(&task("t2", "b"), &mut groups, 1000);
    tracker.observe(&task("t3", "c"), &mut groups, 1000);

    for i in 0..5 {
        let fold = tracker.observe(&action("t1", "Bash", &format!("step {i}")), &mut groups, 1000);
        assert!(matches!(fold, Fold::Ephemeral { .. }));
    }
    assert_eq!(groups.len(), 1, "updates never create a second group");
}

#[test]
fn a_concurrent_non_task_turn_is_unaffected_by_an_active_group() {
    let mut tracker = ParallelTaskTracker::new();
    let mut groups = HashMap::new();
    tracker.observe(&task("t1", "a"), &mut groups, 1000);
    tracker.observe(&task("t2", "b"), &mut groups, 1000);

    let fold = tracker.observe(&action("unrelated", "Bash", "ls"), &mut groups, 1000);
    assert_eq!(fold, Fold::Unaffected);
}

#[test]
fn stale_groups_are_swept_after_one_hour() {
    let mut tracker = ParallelTaskTracker::new();
    let mut groups = HashMap::new();
    tracker.observe(&task("t1", "a"), &mut groups, 0);
    tracker.observe(&task("t2", "b"), &mut groups, 0);
    assert_eq!(groups.len(), 1);

    let dropped = tracker.sweep_stale(&mut groups, 3600);
    assert!(dropped.is_empty(), "exactly one hour is not yet stale");

    let dropped = tracker.sweep_stale(&mut groups, 3601);
    assert_eq!(dropped.len(), 1);
    assert!(groups.is_empty());
}
