// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn plain_repo_is_catch_all() {
    let repo = RepositoryConfig::builder().build();
    assert!(repo.is_catch_all());
}

#[test]
fn team_keys_disqualify_catch_all() {
    let repo = RepositoryConfig::builder()
        .team_keys(std::collections::HashSet::from(["FE".to_string()]))
        .build();
    assert!(!repo.is_catch_all());
}

#[test]
fn routing_labels_disqualify_catch_all() {
    let repo = RepositoryConfig::builder()
        .routing_labels(Some(RoutingLabels {
            include: std::collections::HashSet::from(["ui".to_string()]),
            exclude: std::collections::HashSet::new(),
            priority: 10,
        }))
        .build();
    assert!(!repo.is_catch_all());
}

#[test]
fn default_allowed_tools_include_bash_and_task() {
    let tools = RepositoryConfig::default_allowed_tools();
    assert!(tools.iter().any(|t| t == "Bash"));
    assert!(tools.iter().any(|t| t == "Task"));
}

#[test]
fn serde_roundtrip_preserves_fields() {
    let repo = RepositoryConfig::builder()
        .id("repo-x")
        .team_keys(std::collections::HashSet::from(["FE".to_string()]))
        .build();
    let json = serde_json::to_string(&repo).unwrap();
    let back: RepositoryConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(repo, back);
}
