// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository configuration: identity, credentials, and routing hints for
//! one source code repository the orchestrator can act on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Label-based routing rule for a repository.
///
/// A repository with `routingLabels` set is disqualified from a webhook
/// event whenever any `exclude` label is present; otherwise it is
/// eligible when `include ∩ event.labels` is non-empty. Eligible repos
/// are ranked by `priority`, ties broken by configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingLabels {
    #[serde(default)]
    pub include: HashSet<String>,
    #[serde(default)]
    pub exclude: HashSet<String>,
    #[serde(default)]
    pub priority: i32,
}

/// Identity, credentials, and routing hints for one repository.
///
/// Invariant: at most one repository per `linearWorkspaceId` may be a
/// **workspace catch-all** — no `team_keys`, no `routing_labels`, no
/// `project_keys`. The router relies on this for deterministic
/// fallback; [`RepositoryConfig::is_catch_all`] tests it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub id: String,
    pub name: String,
    pub repository_path: PathBuf,
    pub base_branch: String,
    #[serde(default = "RepositoryConfig::default_workspace_base_dir")]
    pub workspace_base_dir: PathBuf,

    pub tracker_token: String,
    pub tracker_workspace_id: String,

    #[serde(default)]
    pub team_keys: HashSet<String>,
    #[serde(default)]
    pub routing_labels: Option<RoutingLabels>,
    #[serde(default)]
    pub project_keys: HashSet<String>,

    #[serde(default = "RepositoryConfig::default_allowed_tools")]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub disallowed_tools: Vec<String>,
    #[serde(default = "RepositoryConfig::default_label_prompts")]
    pub label_prompts: std::collections::HashMap<String, Vec<String>>,
    #[serde(default)]
    pub is_active: bool,
}

impl RepositoryConfig {
    pub fn default_workspace_base_dir() -> PathBuf {
        PathBuf::from("workspaces")
    }

    pub fn default_allowed_tools() -> Vec<String> {
        vec![
            "Read(**)".to_string(),
            "Edit(**)".to_string(),
            "Task".to_string(),
            "WebFetch".to_string(),
            "WebSearch".to_string(),
            "TodoRead".to_string(),
            "TodoWrite".to_string(),
            "NotebookRead".to_string(),
            "NotebookEdit".to_string(),
            "Batch".to_string(),
            "Bash".to_string(),
        ]
    }

    pub fn default_label_prompts() -> std::collections::HashMap<String, Vec<String>> {
        let mut m = std::collections::HashMap::new();
        m.insert("debugger".to_string(), vec!["Bug".to_string()]);
        m.insert("builder".to_string(), vec!["Feature".to_string()]);
        m.insert("scoper".to_string(), vec!["PRD".to_string()]);
        m
    }

    /// True when this repository has no routing filters at all, making it
    /// eligible as a workspace catch-all fallback.
    pub fn is_catch_all(&self) -> bool {
        self.team_keys.is_empty() && self.routing_labels.is_none() && self.project_keys.is_empty()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct RepositoryConfigBuilder => RepositoryConfig {
        into {
            id: String = "repo-1",
            name: String = "test-repo",
            base_branch: String = "main",
            tracker_token: String = "token",
            tracker_workspace_id: String = "ws-1",
        }
        set {
            repository_path: std::path::PathBuf = std::path::PathBuf::from("/tmp/repo"),
            workspace_base_dir: std::path::PathBuf = std::path::PathBuf::from("/tmp/workspaces"),
            team_keys: std::collections::HashSet<String> = std::collections::HashSet::new(),
            routing_labels: Option<RoutingLabels> = None,
            project_keys: std::collections::HashSet<String> = std::collections::HashSet::new(),
            allowed_tools: Vec<String> = RepositoryConfig::default_allowed_tools(),
            disallowed_tools: Vec<String> = Vec::new(),
            label_prompts: std::collections::HashMap<String, Vec<String>> = RepositoryConfig::default_label_prompts(),
            is_active: bool = true,
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
