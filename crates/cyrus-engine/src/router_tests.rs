// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cyrus_adapters::FakeIssueTracker;
use cyrus_core::{RepositoryConfig, RoutingLabels, WebhookEvent};

fn repo(id: &str, team_keys: &[&str]) -> RepositoryConfig {
    RepositoryConfig::builder()
        .id(id)
        .tracker_workspace_id("org-1")
        .team_keys(team_keys.iter().map(|s| s.to_string()).collect())
        .build()
}

fn labeled_repo(id: &str, include: &[&str], exclude: &[&str], priority: i32) -> RepositoryConfig {
    RepositoryConfig::builder()
        .id(id)
        .tracker_workspace_id("org-1")
        .routing_labels(Some(RoutingLabels {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            priority,
        }))
        .build()
}

fn catch_all(id: &str) -> RepositoryConfig {
    RepositoryConfig::builder().id(id).tracker_workspace_id("org-1").build()
}

fn assigned(team_key: &str, labels: &[&str]) -> WebhookEvent {
    WebhookEvent::IssueAssigned {
        organization_id: "org-1".into(),
        issue_id: "i1".into(),
        issue_identifier: "FE-12".into(),
        team_key: team_key.into(),
        labels: labels.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn scenario_a_team_key_route_performs_no_tracker_rpc() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![repo("frontend", &["FE"]), repo("backend", &["BE"])];
    let event = assigned("FE", &[]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap().unwrap();
    assert_eq!(chosen.id, "frontend");
    assert_eq!(tracker.get_issue_call_count(), 0);
}

#[tokio::test]
async fn scenario_b_label_route_picks_higher_priority() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![
        labeled_repo("frontend", &["ui"], &[], 100),
        labeled_repo("backend", &["api"], &[], 90),
    ];
    let event = assigned("OTHER", &["ui", "api"]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap().unwrap();
    assert_eq!(chosen.id, "frontend");
}

#[yare::parameterized(
    frontend_first = (100, 90, "frontend"),
    backend_first = (90, 100, "backend"),
)]
#[test_macro = "tokio::test"]
async fn routing_priority_reverses_with_the_scores(frontend_prio: i32, backend_prio: i32, expected: &str) {
    let tracker = FakeIssueTracker::new();
    let repos = vec![
        labeled_repo("frontend", &["ui"], &[], frontend_prio),
        labeled_repo("backend", &["api"], &[], backend_prio),
    ];
    let event = assigned("OTHER", &["ui", "api"]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap().unwrap();
    assert_eq!(chosen.id, expected);
}

#[tokio::test]
async fn exclusion_disqualifies_a_repo_even_with_a_matching_include() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![labeled_repo("frontend", &["feature"], &["wontfix"], 100)];
    let event = assigned("OTHER", &["feature", "wontfix"]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap();
    assert!(chosen.is_none());
}

#[tokio::test]
async fn falls_back_to_the_single_catch_all() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![repo("frontend", &["FE"]), catch_all("default")];
    let event = assigned("OTHER", &[]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap().unwrap();
    assert_eq!(chosen.id, "default");
}

#[tokio::test]
async fn two_catch_alls_is_a_configuration_error() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![catch_all("default-a"), catch_all("default-b")];
    let event = assigned("OTHER", &[]);

    let err = Router::route(&event, &repos, &tracker).await.unwrap_err();
    assert_eq!(err, RouterError::AmbiguousCatchAll(2, "org-1".into()));
}

#[tokio::test]
async fn no_match_at_all_drops_the_event() {
    let tracker = FakeIssueTracker::new();
    let repos = vec![repo("frontend", &["FE"])];
    let event = assigned("OTHER", &[]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap();
    assert!(chosen.is_none());
}

#[tokio::test]
async fn label_fetch_failure_falls_through_to_catch_all() {
    let tracker = FakeIssueTracker::new(); // no issue seeded => get_issue returns None
    let repos = vec![labeled_repo("frontend", &["ui"], &[], 100), catch_all("default")];
    let event = WebhookEvent::AgentSessionPrompted {
        organization_id: "org-1".into(),
        issue_id: "missing-issue".into(),
        session_id: "sess-1".into(),
        prompt: "go".into(),
        author: None,
    };

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap().unwrap();
    assert_eq!(chosen.id, "default");
    assert_eq!(tracker.get_issue_call_count(), 1);
}

#[tokio::test]
async fn inactive_repos_are_never_matched() {
    let tracker = FakeIssueTracker::new();
    let mut inactive = repo("frontend", &["FE"]);
    inactive.is_active = false;
    let repos = vec![inactive];
    let event = assigned("FE", &[]);

    let chosen = Router::route(&event, &repos, &tracker).await.unwrap();
    assert!(chosen.is_none());
}
