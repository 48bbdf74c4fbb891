// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes an inbound webhook event to the repository configuration that
//! owns it (spec §4.1): team-key exact match, then label include/
//! exclude with priority, then a workspace catch-all fallback.

use cyrus_adapters::IssueTracker;
use cyrus_core::{labels_as_set, RepositoryConfig, WebhookEvent};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// More than one workspace catch-all is configured for the same
    /// organization — a configuration error, not a routing ambiguity to
    /// resolve silently (spec §4.1 step 3, DESIGN.md Open Question 1).
    #[error("ambiguous workspace catch-all: {0} repositories with no routing filters for organization {1}")]
    AmbiguousCatchAll(usize, String),
}

pub struct Router;

impl Router {
    /// Select the repository that should handle `event`, or `None` if
    /// none matches (dropped with a structured warning by the caller).
    pub async fn route(
        event: &WebhookEvent,
        repos: &[RepositoryConfig],
        tracker: &dyn IssueTracker,
    ) -> Result<Option<RepositoryConfig>, RouterError> {
        let org_id = event.organization_id();
        let active: Vec<&RepositoryConfig> =
            repos.iter().filter(|r| r.is_active && r.tracker_workspace_id == org_id).collect();

        // Step 1: team-key exact match, no tracker RPC.
        if let Some(team_key) = event.team_key() {
            let matches: Vec<&&RepositoryConfig> =
                active.iter().filter(|r| r.team_keys.contains(team_key)).collect();
            if matches.len() == 1 {
                return Ok(Some((*matches[0]).clone()));
            }
        }

        // Step 2: label-based match. Use labels embedded in the webhook
        // payload when present; otherwise fetch once from the tracker.
        let labels: Vec<String> = match event.labels() {
            Some(labels) => labels.to_vec(),
            None => match tracker.get_issue(event.issue_id()).await {
                Ok(Some(issue)) => issue.labels,
                Ok(None) => Vec::new(),
                Err(e) => {
                    warn!(issue_id = event.issue_id(), error = %e, "failed fetching issue labels for routing");
                    Vec::new()
                }
            },
        };
        if !labels.is_empty() {
            let label_set: HashSet<&str> = labels_as_set(&labels);
            let mut eligible: Vec<(usize, &&RepositoryConfig)> = Vec::new();
            for (idx, repo) in active.iter().enumerate() {
                let Some(routing) = &repo.routing_labels else { continue };
                if routing.exclude.iter().any(|l| label_set.contains(l.as_str())) {
                    continue;
                }
                let matched = routing.include.iter().any(|l| label_set.contains(l.as_str()));
                if matched {
                    eligible.push((idx, repo));
                }
            }
            if let Some((_, repo)) = eligible
                .into_iter()
                .max_by(|(idx_a, a), (idx_b, b)| {
                    let prio_a = a.routing_labels.as_ref().map(|r| r.priority).unwrap_or(0);
                    let prio_b = b.routing_labels.as_ref().map(|r| r.priority).unwrap_or(0);
                    // Higher priority wins; ties keep the earlier
                    // (lower index) configuration entry, matching the
                    // "stable" tie-break in spec §4.1 step 2.
                    prio_a.cmp(&prio_b).then(idx_b.cmp(idx_a))
                })
            {
                warn!(labels = %labels.join(","), "routed by label match");
                return Ok(Some((*repo).clone()));
            }
        }

        // Step 3: workspace catch-all fallback.
        let catch_alls: Vec<&&RepositoryConfig> = active.iter().filter(|r| r.is_catch_all()).collect();
        match catch_alls.len() {
            0 => Ok(None),
            1 => Ok(Some((*catch_alls[0]).clone())),
            n => {
                warn!(organization_id = org_id, count = n, "multiple workspace catch-alls configured");
                Err(RouterError::AmbiguousCatchAll(n, org_id.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
