// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized webhook events routed into the orchestrator.
//!
//! These are produced by a tracker-side translator (out of scope for this
//! crate) from the raw HTTP payload; see `cyrus_wire::payload` for the
//! wire-format parsing step that builds these.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A normalized, tracker-agnostic inbound event.
///
/// Serializes with `{"type": "event:name", ...fields}`. Variants beyond
/// what a given tracker translator emits are simply never constructed;
/// there is no catch-all variant because, unlike `Event` in the
/// persistence layer, this type is never round-tripped through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    #[serde(rename = "issue:assigned")]
    IssueAssigned {
        organization_id: String,
        issue_id: String,
        issue_identifier: String,
        team_key: String,
        #[serde(default)]
        labels: Vec<String>,
    },

    #[serde(rename = "agent_session:created")]
    AgentSessionCreated {
        organization_id: String,
        issue_id: String,
        issue_identifier: String,
        team_key: String,
        session_id: String,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        labels: Vec<String>,
    },

    #[serde(rename = "agent_session:prompted")]
    AgentSessionPrompted {
        organization_id: String,
        issue_id: String,
        session_id: String,
        prompt: String,
        #[serde(default)]
        author: Option<String>,
    },

    #[serde(rename = "issue:unassigned")]
    IssueUnassigned { organization_id: String, issue_id: String },

    #[serde(rename = "issue:comment_mention")]
    IssueCommentMention {
        organization_id: String,
        issue_id: String,
        issue_identifier: String,
        team_key: String,
        prompt: String,
        author: String,
        #[serde(default)]
        labels: Vec<String>,
        #[serde(default)]
        attachments: Vec<String>,
    },

    #[serde(rename = "issue:status_changed")]
    IssueStatusChanged { organization_id: String, issue_id: String, status: String },
}

impl WebhookEvent {
    pub fn organization_id(&self) -> &str {
        match self {
            WebhookEvent::IssueAssigned { organization_id, .. }
            | WebhookEvent::AgentSessionCreated { organization_id, .. }
            | WebhookEvent::AgentSessionPrompted { organization_id, .. }
            | WebhookEvent::IssueUnassigned { organization_id, .. }
            | WebhookEvent::IssueCommentMention { organization_id, .. }
            | WebhookEvent::IssueStatusChanged { organization_id, .. } => organization_id,
        }
    }

    pub fn issue_id(&self) -> &str {
        match self {
            WebhookEvent::IssueAssigned { issue_id, .. }
            | WebhookEvent::AgentSessionCreated { issue_id, .. }
            | WebhookEvent::AgentSessionPrompted { issue_id, .. }
            | WebhookEvent::IssueUnassigned { issue_id, .. }
            | WebhookEvent::IssueCommentMention { issue_id, .. }
            | WebhookEvent::IssueStatusChanged { issue_id, .. } => issue_id,
        }
    }

    /// Team key carried directly on the event, when the variant has one.
    /// Routing falls back to a label fetch when this is `None`.
    pub fn team_key(&self) -> Option<&str> {
        match self {
            WebhookEvent::IssueAssigned { team_key, .. }
            | WebhookEvent::AgentSessionCreated { team_key, .. }
            | WebhookEvent::IssueCommentMention { team_key, .. } => Some(team_key),
            _ => None,
        }
    }

    /// Labels carried directly on the event, if any were embedded in the
    /// webhook payload (avoids a tracker RPC in the common case).
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            WebhookEvent::IssueAssigned { labels, .. }
            | WebhookEvent::AgentSessionCreated { labels, .. }
            | WebhookEvent::IssueCommentMention { labels, .. } => Some(labels.as_slice()),
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            WebhookEvent::AgentSessionCreated { session_id, .. }
            | WebhookEvent::AgentSessionPrompted { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    /// Whether this variant starts a brand-new session (as opposed to
    /// addressing an existing one).
    pub fn starts_new_session(&self) -> bool {
        matches!(
            self,
            WebhookEvent::IssueAssigned { .. } | WebhookEvent::AgentSessionCreated { .. }
        )
    }
}

/// Labels as a set, for routing comparisons.
pub fn labels_as_set(labels: &[String]) -> HashSet<&str> {
    labels.iter().map(String::as_str).collect()
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
