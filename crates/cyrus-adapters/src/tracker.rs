// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `IssueTracker` capability set the orchestration core consumes
//! (spec §6). The concrete tracker transport (Linear today) is out of
//! scope for this crate; it defines the seam and, behind
//! `test-support`, an in-process `FakeIssueTracker` double.

use async_trait::async_trait;
use cyrus_wire::ActivityContent;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("tracker request timed out")]
    Timeout,
    #[error("tracker returned {0}")]
    Http(u16),
    #[error("tracker rejected credentials (401)")]
    AuthenticationFailure,
    #[error("tracker error: {0}")]
    Other(String),
}

impl TrackerError {
    /// Whether a caller should retry this with backoff (spec §7
    /// `TransientIO`), as opposed to isolating it per-repository
    /// (`AuthenticationFailure`).
    pub fn is_transient(&self) -> bool {
        matches!(self, TrackerError::Timeout | TrackerError::Http(s) if *s >= 500)
    }
}

/// An issue fetched from the tracker, including the async-only fields
/// (team key, labels) the `Router`'s label-matching step needs when a
/// webhook didn't carry them inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueData {
    pub id: String,
    pub identifier: String,
    pub team_key: String,
    pub labels: Vec<String>,
}

/// Result of `createAgentSessionOn{Issue|Comment}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAgentSession {
    pub success: bool,
    pub agent_session_id: String,
    pub last_sync_id: u64,
}

/// Confirmation of one `postAgentActivity` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPosted {
    pub activity_id: String,
}

/// `updateIssueState`'s `stateType` mapping (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStateType {
    Active,
    Completed,
    Failed,
    Paused,
}

impl std::fmt::Display for IssueStateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IssueStateType::Active => "In Progress",
            IssueStateType::Completed => "Done",
            IssueStateType::Failed => "Canceled",
            IssueStateType::Paused => "Paused",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub asset_url: String,
    pub size: u64,
    pub content_type: String,
}

/// Uniform tracker RPCs the orchestration core consumes. Object-safe so
/// the orchestrator can hold `Arc<dyn IssueTracker>` per repository.
#[async_trait]
pub trait IssueTracker: Send + Sync + 'static {
    async fn get_issue(&self, issue_id: &str) -> Result<Option<IssueData>, TrackerError>;

    async fn create_agent_session_on_issue(
        &self,
        issue_id: &str,
        external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError>;

    async fn create_agent_session_on_comment(
        &self,
        comment_id: &str,
        external_link: Option<&str>,
    ) -> Result<CreatedAgentSession, TrackerError>;

    async fn post_agent_activity(
        &self,
        agent_session_id: &str,
        content: ActivityContent,
        ephemeral: bool,
    ) -> Result<ActivityPosted, TrackerError>;

    async fn update_issue_state(
        &self,
        issue_id: &str,
        state: IssueStateType,
    ) -> Result<(), TrackerError>;

    async fn upload_file(
        &self,
        path: &Path,
        filename: Option<&str>,
        content_type: Option<&str>,
        make_public: bool,
    ) -> Result<UploadedFile, TrackerError>;
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
