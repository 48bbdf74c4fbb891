// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process `IssueTracker` test double. Models the tracker's ephemeral-
//! activity replace semantics (spec §6) so tests can assert on the
//! *visible* timeline rather than the raw call sequence.

use crate::tracker::{
    ActivityPosted, CreatedAgentSession, IssueData, IssueStateType, IssueTracker, TrackerError,
    UploadedFile,
};
use async_trait::async_trait;
use cyrus_wire::ActivityContent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// One entry in a session's visible activity timeline, after ephemeral
/// replacement has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    pub content: ActivityContent,
    pub ephemeral: bool,
}

#[derive(Default)]
struct Inner {
    issues: HashMap<String, IssueData>,
    timelines: HashMap<String, Vec<TimelineEntry>>,
    /// Every accepted `post_agent_activity` call, in order, before
    /// ephemeral collapse — lets tests assert on raw call volume
    /// distinct from the collapsed timeline.
    raw_post_count: usize,
    get_issue_calls: usize,
    issue_states: HashMap<String, IssueStateType>,
    created_session_count: usize,
    next_id: u64,
    uploads: Vec<(String, bool)>,
}

/// In-memory `IssueTracker` recording every call for assertions.
#[derive(Default)]
pub struct FakeIssueTracker {
    inner: Mutex<Inner>,
}

impl FakeIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(self, issue: IssueData) -> Self {
        self.inner.lock().issues.insert(issue.id.clone(), issue);
        self
    }

    pub fn get_issue_call_count(&self) -> usize {
        self.inner.lock().get_issue_calls
    }

    pub fn raw_post_count(&self) -> usize {
        self.inner.lock().raw_post_count
    }

    pub fn created_session_count(&self) -> usize {
        self.inner.lock().created_session_count
    }

    /// The collapsed, tracker-visible timeline for one agent session:
    /// ephemeral entries are superseded by whatever posts after them,
    /// matching the real tracker's rendering contract.
    pub fn timeline(&self, agent_session_id: &str) -> Vec<TimelineEntry> {
        self.inner.lock().timelines.get(agent_session_id).cloned().unwrap_or_default()
    }

    pub fn issue_state(&self, issue_id: &str) -> Option<IssueStateType> {
        self.inner.lock().issue_states.get(issue_id).copied()
    }

    fn next_id(inner: &mut Inner, prefix: &str) -> String {
        inner.next_id += 1;
        format!("{prefix}{}", inner.next_id)
    }
}

#[async_trait]
impl IssueTracker for FakeIssueTracker {
    async fn get_issue(&self, issue_id: &str) -> Result<Option<IssueData>, TrackerError> {
        let mut inner = self.inner.lock();
        inner.get_issue_calls += 1;
        Ok(inner.issues.get(issue_id).cloned())
    }

    async fn create_agent_session_on_issue(
        &self,
        issue_id: &str,
        _external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError> {
        let _ = issue_id;
        let mut inner = self.inner.lock();
        inner.created_session_count += 1;
        let agent_session_id = Self::next_id(&mut inner, "tracker-session-");
        Ok(CreatedAgentSession {
            success: true,
            agent_session_id,
            last_sync_id: inner.created_session_count as u64,
        })
    }

    async fn create_agent_session_on_comment(
        &self,
        comment_id: &str,
        _external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError> {
        self.create_agent_session_on_issue(comment_id, None).await
    }

    async fn post_agent_activity(
        &self,
        agent_session_id: &str,
        content: ActivityContent,
        ephemeral: bool,
    ) -> Result<ActivityPosted, TrackerError> {
        let mut inner = self.inner.lock();
        inner.raw_post_count += 1;
        let id = Self::next_id(&mut inner, "activity-");
        let timeline = inner.timelines.entry(agent_session_id.to_string()).or_default();
        // Any newer post supersedes a prior ephemeral entry (spec §6:
        // "creating a new activity with ephemeral=true replaces any
        // previous ephemeral activity on the same session"; spec §4.3's
        // glossary broadens this to "a newer activity with the same
        // flag, or a non-ephemeral one").
        if matches!(timeline.last(), Some(e) if e.ephemeral) {
            timeline.pop();
        }
        timeline.push(TimelineEntry { id: id.clone(), content, ephemeral });
        Ok(ActivityPosted { activity_id: id })
    }

    async fn update_issue_state(
        &self,
        issue_id: &str,
        state: IssueStateType,
    ) -> Result<(), TrackerError> {
        self.inner.lock().issue_states.insert(issue_id.to_string(), state);
        Ok(())
    }

    async fn upload_file(
        &self,
        path: &Path,
        filename: Option<&str>,
        content_type: Option<&str>,
        make_public: bool,
    ) -> Result<UploadedFile, TrackerError> {
        let mut inner = self.inner.lock();
        inner.uploads.push((path.display().to_string(), make_public));
        let id = Self::next_id(&mut inner, "asset-");
        Ok(UploadedFile {
            asset_url: format!("https://uploads.test/{id}/{}", filename.unwrap_or("file")),
            size: 0,
            content_type: content_type.unwrap_or("application/octet-stream").to_string(),
        })
    }
}

#[cfg(test)]
#[path = "fake_tracker_tests.rs"]
mod tests;
