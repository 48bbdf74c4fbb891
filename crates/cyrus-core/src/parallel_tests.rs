// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_group_starts_pending_and_incomplete() {
    let group = ParallelAgentGroup::new(0);
    assert!(group.ephemeral_activity_pending);
    assert!(!group.is_complete());
}

#[test]
fn is_complete_requires_all_agents_done() {
    let mut group = ParallelAgentGroup::new(0);
    group.agents.insert("tu1".into(), ParallelAgentProgress::new("fix auth"));
    group.agents.insert("tu2".into(), ParallelAgentProgress::new("fix tests"));
    assert!(!group.is_complete());

    group.agents.get_mut("tu1").unwrap().completed = true;
    assert!(!group.is_complete());

    group.agents.get_mut("tu2").unwrap().completed = true;
    assert!(group.is_complete());
}

#[test]
fn empty_group_is_not_complete() {
    assert!(!ParallelAgentGroup::new(0).is_complete());
}

#[test]
fn render_shows_running_header_and_per_agent_lines() {
    let mut group = ParallelAgentGroup::new(0);
    let mut a = ParallelAgentProgress::new("fix auth");
    a.tool_count = 3;
    a.current_action = Some("Editing src/auth.rs".into());
    group.agents.insert("tu1".into(), a);

    let rendered = group.render();
    assert!(rendered.starts_with("Running 0 of 1 agents…"));
    assert!(rendered.contains("🔄 fix auth (3 tools)"));
    assert!(rendered.contains("Editing src/auth.rs"));
}

#[test]
fn render_shows_completed_header_when_all_done() {
    let mut group = ParallelAgentGroup::new(0);
    let mut a = ParallelAgentProgress::new("fix auth");
    a.completed = true;
    group.agents.insert("tu1".into(), a);

    let rendered = group.render();
    assert!(rendered.starts_with("Completed 1 agents"));
    assert!(rendered.contains("✅ fix auth"));
}

#[test]
fn is_stale_after_max_age() {
    let group = ParallelAgentGroup::new(1_000);
    assert!(!group.is_stale(1_500, 3_600));
    assert!(group.is_stale(1_000 + 3_601, 3_600));
}
