// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_issue_assigned() {
    let body = br#"{
        "type": "AgentSessionEvent",
        "action": "assigned",
        "organizationId": "org-1",
        "issue": {"id": "i1", "identifier": "ENG-1", "title": "Fix bug", "team": {"key": "ENG"}, "labels": ["bug"]}
    }"#;
    let event = parse(body).unwrap();
    match event {
        WebhookEvent::IssueAssigned { organization_id, issue_id, team_key, labels, .. } => {
            assert_eq!(organization_id, "org-1");
            assert_eq!(issue_id, "i1");
            assert_eq!(team_key, "ENG");
            assert_eq!(labels, vec!["bug".to_string()]);
        }
        other => panic!("expected IssueAssigned, got {other:?}"),
    }
}

#[test]
fn parses_agent_session_created_with_prompt() {
    let body = br#"{
        "type": "AgentSessionEvent",
        "action": "created",
        "organizationId": "org-1",
        "issue": {"id": "i1", "identifier": "ENG-1", "title": "Fix bug", "team": {"key": "ENG"}},
        "agentSession": {"id": "as-1"},
        "message": {"content": "please start"}
    }"#;
    let event = parse(body).unwrap();
    match event {
        WebhookEvent::AgentSessionCreated { session_id, prompt, .. } => {
            assert_eq!(session_id, "as-1");
            assert_eq!(prompt.as_deref(), Some("please start"));
        }
        other => panic!("expected AgentSessionCreated, got {other:?}"),
    }
}

#[test]
fn parses_agent_session_prompted() {
    let body = br#"{
        "type": "AgentSessionEvent",
        "action": "prompted",
        "organizationId": "org-1",
        "issue": {"id": "i1", "identifier": "ENG-1"},
        "agentSession": {"id": "as-1"},
        "message": {"content": "also handle edge case X"},
        "author": "alice"
    }"#;
    let event = parse(body).unwrap();
    match event {
        WebhookEvent::AgentSessionPrompted { prompt, author, .. } => {
            assert_eq!(prompt, "also handle edge case X");
            assert_eq!(author.as_deref(), Some("alice"));
        }
        other => panic!("expected AgentSessionPrompted, got {other:?}"),
    }
}

#[test]
fn parses_issue_unassigned() {
    let body = br#"{
        "type": "AgentSessionEvent",
        "action": "unassigned",
        "organizationId": "org-1",
        "issue": {"id": "i1", "identifier": "ENG-1"}
    }"#;
    assert!(matches!(parse(body).unwrap(), WebhookEvent::IssueUnassigned { .. }));
}

#[test]
fn parses_comment_mention() {
    let body = br#"{
        "type": "IssueCommentReaction",
        "action": "commented",
        "organizationId": "org-1",
        "issue": {"id": "i1", "identifier": "ENG-1", "team": {"key": "ENG"}, "labels": []},
        "message": {"content": "@cyrus please also fix the typo"},
        "author": "bob"
    }"#;
    let event = parse(body).unwrap();
    assert!(matches!(event, WebhookEvent::IssueCommentMention { .. }));
}

#[test]
fn rejects_malformed_json() {
    assert!(matches!(parse(b"not json"), Err(PayloadError::MalformedJson(_))));
}

#[test]
fn rejects_unrecognized_type_action_pair() {
    let body = br#"{"type": "Unknown", "action": "whatever", "organizationId": "org-1"}"#;
    assert!(matches!(parse(body), Err(PayloadError::UnrecognizedEvent(_, _))));
}

#[test]
fn rejects_missing_required_field() {
    let body = br#"{"type": "AgentSessionEvent", "action": "assigned", "organizationId": "org-1"}"#;
    assert_eq!(parse(body), Err(PayloadError::MissingField("issue")));
}
