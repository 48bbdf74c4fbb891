// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the raw webhook JSON body into a [`WebhookEvent`] (spec §6).
//!
//! The raw shape is intentionally permissive — trackers vary in which
//! optional fields they include — and this module is the single place
//! that reconciles it into the crate-wide normalized event.

use cyrus_core::WebhookEvent;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("malformed webhook JSON: {0}")]
    MalformedJson(String),
    #[error("unrecognized (type, action) combination: ({0:?}, {1:?})")]
    UnrecognizedEvent(String, String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    key: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    id: String,
    identifier: String,
    #[allow(dead_code)]
    title: Option<String>,
    team: Option<RawTeam>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAgentSession {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWebhookPayload {
    #[serde(rename = "type")]
    event_type: String,
    action: String,
    organization_id: String,
    issue: Option<RawIssue>,
    agent_session: Option<RawAgentSession>,
    message: Option<RawMessage>,
    #[serde(default)]
    attachments: Vec<String>,
    author: Option<String>,
}

/// Parse and normalize a raw webhook body.
pub fn parse(body: &[u8]) -> Result<WebhookEvent, PayloadError> {
    let raw: RawWebhookPayload =
        serde_json::from_slice(body).map_err(|e| PayloadError::MalformedJson(e.to_string()))?;

    match (raw.event_type.as_str(), raw.action.as_str()) {
        ("AgentSessionEvent", "assigned") => {
            let issue = raw.issue.ok_or(PayloadError::MissingField("issue"))?;
            let team_key = issue.team.map(|t| t.key).ok_or(PayloadError::MissingField("issue.team.key"))?;
            Ok(WebhookEvent::IssueAssigned {
                organization_id: raw.organization_id,
                issue_id: issue.id,
                issue_identifier: issue.identifier,
                team_key,
                labels: issue.labels,
            })
        }
        ("AgentSessionEvent", "created") => {
            let issue = raw.issue.ok_or(PayloadError::MissingField("issue"))?;
            let team_key = issue.team.map(|t| t.key).ok_or(PayloadError::MissingField("issue.team.key"))?;
            let session_id = raw
                .agent_session
                .map(|s| s.id)
                .ok_or(PayloadError::MissingField("agentSession.id"))?;
            Ok(WebhookEvent::AgentSessionCreated {
                organization_id: raw.organization_id,
                issue_id: issue.id,
                issue_identifier: issue.identifier,
                team_key,
                session_id,
                prompt: raw.message.and_then(|m| m.content),
                labels: issue.labels,
            })
        }
        ("AgentSessionEvent", "prompted") => {
            let issue = raw.issue.ok_or(PayloadError::MissingField("issue"))?;
            let session_id = raw
                .agent_session
                .map(|s| s.id)
                .ok_or(PayloadError::MissingField("agentSession.id"))?;
            let prompt = raw
                .message
                .and_then(|m| m.content)
                .ok_or(PayloadError::MissingField("message.content"))?;
            Ok(WebhookEvent::AgentSessionPrompted {
                organization_id: raw.organization_id,
                issue_id: issue.id,
                session_id,
                prompt,
                author: raw.author,
            })
        }
        ("AgentSessionEvent", "unassigned") => {
            let issue = raw.issue.ok_or(PayloadError::MissingField("issue"))?;
            Ok(WebhookEvent::IssueUnassigned { organization_id: raw.organization_id, issue_id: issue.id })
        }
        ("IssueCommentReaction", "commented") | ("AgentSessionEvent", "commented") => {
            let issue = raw.issue.ok_or(PayloadError::MissingField("issue"))?;
            let team_key = issue.team.map(|t| t.key).ok_or(PayloadError::MissingField("issue.team.key"))?;
            let prompt = raw
                .message
                .and_then(|m| m.content)
                .ok_or(PayloadError::MissingField("message.content"))?;
            let author = raw.author.ok_or(PayloadError::MissingField("author"))?;
            Ok(WebhookEvent::IssueCommentMention {
                organization_id: raw.organization_id,
                issue_id: issue.id,
                issue_identifier: issue.identifier,
                team_key,
                prompt,
                author,
                labels: issue.labels,
                attachments: raw.attachments,
            })
        }
        (event_type, action) => Err(PayloadError::UnrecognizedEvent(event_type.to_string(), action.to_string())),
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
