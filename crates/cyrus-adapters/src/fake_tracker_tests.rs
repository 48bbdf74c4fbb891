// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn content(body: &str) -> ActivityContent {
    ActivityContent::Thought { body: body.to_string() }
}

#[tokio::test]
async fn ephemeral_posts_replace_each_other_in_the_visible_timeline() {
    let tracker = FakeIssueTracker::new();
    tracker.post_agent_activity("s1", content("Running 0 of 3"), true).await.unwrap();
    tracker.post_agent_activity("s1", content("Running 1 of 3"), true).await.unwrap();
    tracker.post_agent_activity("s1", content("Running 2 of 3"), true).await.unwrap();

    assert_eq!(tracker.raw_post_count(), 3);
    let timeline = tracker.timeline("s1");
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].content, content("Running 2 of 3"));
}

#[tokio::test]
async fn non_ephemeral_post_settles_the_ephemeral_entry() {
    let tracker = FakeIssueTracker::new();
    tracker.post_agent_activity("s1", content("Running 2 of 3"), true).await.unwrap();
    tracker.post_agent_activity("s1", content("Completed 3 agents"), false).await.unwrap();

    let timeline = tracker.timeline("s1");
    assert_eq!(timeline.len(), 1);
    assert!(!timeline[0].ephemeral);
    assert_eq!(timeline[0].content, content("Completed 3 agents"));
}

#[tokio::test]
async fn separate_sessions_have_independent_timelines() {
    let tracker = FakeIssueTracker::new();
    tracker.post_agent_activity("s1", content("a"), false).await.unwrap();
    tracker.post_agent_activity("s2", content("b"), false).await.unwrap();
    assert_eq!(tracker.timeline("s1").len(), 1);
    assert_eq!(tracker.timeline("s2").len(), 1);
}

#[tokio::test]
async fn get_issue_returns_seeded_data_and_counts_the_call() {
    let tracker = FakeIssueTracker::new().with_issue(IssueData {
        id: "i1".into(),
        identifier: "FE-12".into(),
        team_key: "FE".into(),
        labels: vec!["ui".into()],
    });
    let issue = tracker.get_issue("i1").await.unwrap().unwrap();
    assert_eq!(issue.team_key, "FE");
    assert_eq!(tracker.get_issue_call_count(), 1);
    assert!(tracker.get_issue("missing").await.unwrap().is_none());
    assert_eq!(tracker.get_issue_call_count(), 2);
}

#[tokio::test]
async fn update_issue_state_is_observable() {
    let tracker = FakeIssueTracker::new();
    tracker.update_issue_state("i1", IssueStateType::Completed).await.unwrap();
    assert_eq!(tracker.issue_state("i1"), Some(IssueStateType::Completed));
}
