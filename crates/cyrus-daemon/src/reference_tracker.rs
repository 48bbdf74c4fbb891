// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ReferenceIssueTracker`: the `IssueTracker` transport this binary
//! ships with out of the box. The concrete tracker transport (Linear
//! today) is explicitly out of scope for this workspace (spec §1); an
//! operator plugs in a real one by constructing their own `Arc<dyn
//! IssueTracker>` per repository and wiring it where `build_trackers`
//! is called in `main.rs`. Until then, this adapter keeps the daemon
//! fully runnable end-to-end: it records the same ephemeral-activity
//! replace semantics spec §6 requires (so the webhook → activity
//! timeline can be inspected) and narrates every call through
//! `tracing`, rather than silently discarding it.

use async_trait::async_trait;
use cyrus_adapters::{
    ActivityPosted, CreatedAgentSession, IssueData, IssueStateType, IssueTracker, TrackerError,
    UploadedFile,
};
use cyrus_wire::ActivityContent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Default)]
struct Timeline {
    entries: Vec<(String, ActivityContent, bool)>,
}

pub struct ReferenceIssueTracker {
    repository_id: String,
    next_id: AtomicU64,
    timelines: Mutex<HashMap<String, Timeline>>,
}

impl ReferenceIssueTracker {
    pub fn new(repository_id: impl Into<String>) -> Self {
        Self { repository_id: repository_id.into(), next_id: AtomicU64::new(0), timelines: Mutex::new(HashMap::new()) }
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{}-{n}", self.repository_id)
    }
}

#[async_trait]
impl IssueTracker for ReferenceIssueTracker {
    async fn get_issue(&self, issue_id: &str) -> Result<Option<IssueData>, TrackerError> {
        info!(repository_id = %self.repository_id, issue_id, "reference tracker: get_issue (no real labels available)");
        Ok(Some(IssueData {
            id: issue_id.to_string(),
            identifier: issue_id.to_string(),
            team_key: String::new(),
            labels: Vec::new(),
        }))
    }

    async fn create_agent_session_on_issue(
        &self,
        issue_id: &str,
        external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError> {
        let agent_session_id = self.next_id("session");
        info!(repository_id = %self.repository_id, issue_id, external_link, %agent_session_id, "reference tracker: created agent session on issue");
        Ok(CreatedAgentSession { success: true, agent_session_id, last_sync_id: 0 })
    }

    async fn create_agent_session_on_comment(
        &self,
        comment_id: &str,
        external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError> {
        self.create_agent_session_on_issue(comment_id, external_link).await
    }

    async fn post_agent_activity(
        &self,
        agent_session_id: &str,
        content: ActivityContent,
        ephemeral: bool,
    ) -> Result<ActivityPosted, TrackerError> {
        let id = self.next_id("activity");
        info!(repository_id = %self.repository_id, %agent_session_id, ephemeral, "reference tracker: posted activity {:?}", content);
        let mut timelines = self.timelines.lock();
        let timeline = timelines.entry(agent_session_id.to_string()).or_default();
        if matches!(timeline.entries.last(), Some((_, _, true))) {
            timeline.entries.pop();
        }
        timeline.entries.push((id.clone(), content, ephemeral));
        Ok(ActivityPosted { activity_id: id })
    }

    async fn update_issue_state(&self, issue_id: &str, state: IssueStateType) -> Result<(), TrackerError> {
        info!(repository_id = %self.repository_id, issue_id, %state, "reference tracker: update_issue_state");
        Ok(())
    }

    async fn upload_file(
        &self,
        path: &Path,
        filename: Option<&str>,
        content_type: Option<&str>,
        _make_public: bool,
    ) -> Result<UploadedFile, TrackerError> {
        info!(repository_id = %self.repository_id, path = %path.display(), "reference tracker: upload_file (not actually uploaded)");
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let asset_url = match filename {
            Some(name) => format!("file://{}#{name}", path.display()),
            None => format!("file://{}", path.display()),
        };
        Ok(UploadedFile {
            asset_url,
            size,
            content_type: content_type.unwrap_or("application/octet-stream").to_string(),
        })
    }
}

#[cfg(test)]
#[path = "reference_tracker_tests.rs"]
mod tests;
