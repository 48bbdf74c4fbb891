// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::runner_selection::{RunnerSelection, RunnerType};
use crate::session::Session;
use crate::webhook::WebhookEvent;
use std::path::PathBuf;

/// A minimal `Session` with `RunnerType::Mock`, suitable as a starting
/// point in coordinator/engine tests.
pub fn test_session(repository_id: &str, issue_id: &str) -> Session {
    Session::new(
        repository_id,
        issue_id,
        PathBuf::from(format!("/tmp/cyrus-test/{issue_id}")),
        RunnerSelection::new(issue_id, RunnerType::Mock),
        1_000,
    )
}

pub fn issue_assigned_event(org_id: &str, issue_id: &str, team_key: &str) -> WebhookEvent {
    WebhookEvent::IssueAssigned {
        organization_id: org_id.to_string(),
        issue_id: issue_id.to_string(),
        issue_identifier: format!("{team_key}-1"),
        team_key: team_key.to_string(),
        labels: Vec::new(),
    }
}

pub fn comment_mention_event(org_id: &str, issue_id: &str, prompt: &str) -> WebhookEvent {
    WebhookEvent::IssueCommentMention {
        organization_id: org_id.to_string(),
        issue_id: issue_id.to_string(),
        issue_identifier: "ENG-1".to_string(),
        team_key: "ENG".to_string(),
        prompt: prompt.to_string(),
        author: "tester".to_string(),
        labels: Vec::new(),
        attachments: Vec::new(),
    }
}
