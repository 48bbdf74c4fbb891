// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SessionCoordinator` (spec §4.7): owns one session's entire lifetime
//! — starting the runner, driving the state machine, folding sub-agent
//! fan-out into the `ParallelTaskTracker`, and posting narrated activity
//! back to the tracker.

use crate::parallel_tracker::{Fold, ParallelTaskTracker};
use crate::ralph_controller::{RalphDecision, RalphWiggumController};
use cyrus_adapters::{IssueTracker, Runner, RunnerError, RunnerInput, TrackerError};
use cyrus_core::{
    Elicitation, ElicitationResponse, NarrativeEntry, RunnerEvent, Session, SessionEvent,
    SessionStatus,
};
use cyrus_wire::activity::from_runner_event;
use cyrus_wire::ActivityContent;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// Attempts a tracker activity post is retried before it is buffered
/// for a later resend (spec §4.7, §5).
const MAX_POST_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("session transition: {0}")]
    Transition(#[from] cyrus_core::InvalidTransition),
    #[error("runner: {0}")]
    Runner(#[from] RunnerError),
    #[error("tracker: {0}")]
    Tracker(#[from] TrackerError),
    #[error("sendFollowUp requires a streaming runner with a running session")]
    NotStreaming,
    #[error("session is already in a terminal state")]
    AlreadyDone,
}

/// What `completeAndPersist` decided, per the consulted
/// `RalphWiggumController` (spec §4.7, §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Ralph-loop continuation: the Orchestrator should start a fresh
    /// runner with this prompt, reusing the same session.
    Restart { prompt: String },
    /// No further iteration; the session is released back to the
    /// registry as finalized.
    Released,
}

/// Owns one session's state for its entire lifetime; see spec §4.7 for
/// the operation list this mirrors one-for-one.
pub struct SessionCoordinator {
    session: Session,
    tracker: Arc<dyn IssueTracker>,
    runner: Arc<dyn Runner>,
    parallel_tracker: ParallelTaskTracker,
    /// Activities that exhausted `MAX_POST_ATTEMPTS`, to be re-attempted
    /// before new work is accepted for this session (spec §4.7 failure
    /// semantics); persisted alongside the session under
    /// `StateBody::agent_session_entries`.
    pending_posts: Vec<(ActivityContent, bool)>,
}

impl SessionCoordinator {
    pub fn new(session: Session, tracker: Arc<dyn IssueTracker>, runner: Arc<dyn Runner>) -> Self {
        Self { session, tracker, runner, parallel_tracker: ParallelTaskTracker::new(), pending_posts: Vec::new() }
    }

    /// Reconstruct a coordinator around a session recovered from
    /// persisted state (already left dormant in `Stopped` by the
    /// Orchestrator's crash-recovery pass) and any posts that didn't
    /// make it out before the crash.
    pub fn resume(
        session: Session,
        tracker: Arc<dyn IssueTracker>,
        runner: Arc<dyn Runner>,
        buffered_posts: Vec<(ActivityContent, bool)>,
    ) -> Self {
        Self { session, tracker, runner, parallel_tracker: ParallelTaskTracker::new(), pending_posts: buffered_posts }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Activities still awaiting a successful tracker post, to be
    /// persisted with the session and retried on the next event loop
    /// pass (spec §4.7).
    pub fn pending_posts(&self) -> &[(ActivityContent, bool)] {
        &self.pending_posts
    }

    /// `start(prompt, selection)` (spec §4.7): pre-creates the tracker
    /// `agentSessionId`, invokes the runner, and drives
    /// `InitializeRunner`/`RunnerInitialized`. Returns the channel the
    /// caller's event loop drains and feeds to `on_runner_event`.
    pub async fn start(&mut self, prompt: String, now_epoch_ms: u64) -> Result<mpsc::Receiver<RunnerEvent>, CoordinatorError> {
        if self.session.tracker_session_id.is_none() {
            let created = self.tracker.create_agent_session_on_issue(&self.session.issue_id, None).await?;
            self.session.tracker_session_id = Some(created.agent_session_id);
        }
        self.session.state_machine.apply(SessionEvent::InitializeRunner, now_epoch_ms)?;

        let (tx, rx) = mpsc::channel(64);
        let input = if self.runner.supports_streaming() {
            RunnerInput::StreamingInitial(prompt)
        } else {
            RunnerInput::Prompt(prompt)
        };
        let resume_session_id = self.session.runner_selection.resume_session_id.clone();

        match self.runner.start(input, resume_session_id, tx).await {
            Ok(handle) => {
                if let Some(session_id) = handle.session_id {
                    self.session.runner_selection.resume_session_id = Some(session_id);
                }
                self.session.state_machine.apply(SessionEvent::RunnerInitialized, now_epoch_ms)?;
                Ok(rx)
            }
            Err(e) => {
                self.session.set_stderr_tail(&e.to_string());
                self.session.state_machine.try_apply(SessionEvent::Error, now_epoch_ms);
                Err(CoordinatorError::Runner(e))
            }
        }
    }

    /// `sendFollowUp(content)` (spec §4.7): only valid when streaming
    /// and `Running`.
    pub async fn send_follow_up(&mut self, content: String) -> Result<(), CoordinatorError> {
        if !self.runner.supports_streaming() || self.session.state_machine.status() != SessionStatus::Running {
            return Err(CoordinatorError::NotStreaming);
        }
        self.runner.push_message(&content).await?;
        // `AgentSessionPrompted` has no dedicated `RunnerEvent` variant;
        // a follow-up is narrated the same way the canonical final
        // response is (as a `Thought`), distinguished by the marker
        // prefix rather than a new wire shape.
        self.session.record_event(RunnerEvent::Thought { text: format!("(prompted) {content}") });
        Ok(())
    }

    /// `stop(reason)` (spec §4.7): cooperative abort, idempotent on an
    /// already-terminal session.
    pub async fn stop(&mut self, reason: &str, now_epoch_ms: u64) -> Result<(), CoordinatorError> {
        if self.session.is_terminal() {
            return Err(CoordinatorError::AlreadyDone);
        }
        if self.session.state_machine.status() == SessionStatus::Running {
            self.session.state_machine.apply(SessionEvent::StopSignal, now_epoch_ms)?;
        }
        if let Err(e) = self.runner.stop().await {
            warn!(session_id = %self.session.id, error = %e, "runner did not acknowledge stop cleanly");
        }
        self.session.state_machine.try_apply(SessionEvent::RunnerStopped, now_epoch_ms);
        self.session.ended_at = Some(now_epoch_ms);
        tracing::info!(session_id = %self.session.id, reason, "session stopped");
        Ok(())
    }

    /// `onRunnerEvent(ev)` (spec §4.7): the hot path. Classifies and
    /// transitions the state machine, folds the event into the
    /// `ParallelTaskTracker`, posts the formatted activity, and appends
    /// to the narrative. Returns whether the session has just reached a
    /// point where the caller should invoke `completeAndPersist`.
    pub async fn on_runner_event(&mut self, event: RunnerEvent, now_epoch_ms: u64, now_epoch_s: u64) -> Result<bool, CoordinatorError> {
        match &event {
            RunnerEvent::Error { err } => {
                self.session.set_stderr_tail(err);
                self.session.state_machine.try_apply(SessionEvent::Error, now_epoch_ms);
            }
            RunnerEvent::Final { .. } => {
                self.session.state_machine.try_apply(SessionEvent::ResultReceived, now_epoch_ms);
            }
            _ => {
                self.session.state_machine.try_apply(SessionEvent::MessageReceived, now_epoch_ms);
            }
        }

        // Periodic cleanup (spec §4.3): piggyback on the hot path rather
        // than a dedicated timer, since every event carries a fresh
        // clock reading anyway.
        self.parallel_tracker.sweep_stale(&mut self.session.parallel_groups, now_epoch_s);
        let fold = self.parallel_tracker.observe(&event, &mut self.session.parallel_groups, now_epoch_s);
        match fold {
            Fold::Unaffected => self.post_formatted(&event).await,
            Fold::Ephemeral { rendered, .. } => self.post_activity(ActivityContent::Thought { body: rendered }, true).await,
            Fold::Completed { rendered, .. } => self.post_activity(ActivityContent::Thought { body: rendered }, false).await,
        }

        let is_terminal = event.is_final() || self.session.is_terminal();
        self.session.record_event(event);
        Ok(is_terminal)
    }

    /// `completeAndPersist()` (spec §4.7): records `endedAt`, drives
    /// `ResultReceived`/`CleanupComplete`, and consults the
    /// `RalphWiggumController` for a restart decision. The actual
    /// through-the-`PersistenceStore` write is the Orchestrator's job
    /// (spec §5's single persistence-writer task); this returns the
    /// decision the Orchestrator acts on.
    pub fn complete_and_persist(&mut self, now_epoch_ms: u64) -> CompletionOutcome {
        self.session.ended_at = Some(now_epoch_ms);
        self.session.state_machine.try_apply(SessionEvent::ResultReceived, now_epoch_ms);
        self.session.state_machine.try_apply(SessionEvent::CleanupComplete, now_epoch_ms);

        let final_text = self.last_final_text().unwrap_or_default();
        let decision = RalphWiggumController::on_session_completed(&mut self.session.ralph_state, &final_text);
        if let Some(state) = &self.session.ralph_state {
            if let Err(e) = cyrus_storage::ralph_file::write(&self.session.workspace_path, state) {
                warn!(session_id = %self.session.id, error = %e, "failed writing ralph-loop.local.md");
            }
        }
        match decision {
            RalphDecision::Continue { prompt } => CompletionOutcome::Restart { prompt },
            RalphDecision::Stop => CompletionOutcome::Released,
        }
    }

    /// Posts an `elicitation` activity and records it as pending a
    /// matching `response` (spec §6 `postAgentActivity` content types).
    pub async fn post_elicitation(&mut self, elicitation: Elicitation) -> Result<(), CoordinatorError> {
        self.session.pending_elicitations.insert(elicitation.id.clone(), elicitation.clone());
        self.post_activity(ActivityContent::Elicitation(elicitation), false).await;
        Ok(())
    }

    /// Resolves a previously posted elicitation and posts the matching
    /// `response` activity.
    pub async fn post_elicitation_response(&mut self, elicitation_id: &str, response: ElicitationResponse) -> Result<(), CoordinatorError> {
        self.session.pending_elicitations.remove(elicitation_id);
        self.post_activity(ActivityContent::Response(response), false).await;
        Ok(())
    }

    fn last_final_text(&self) -> Option<String> {
        self.session.narrative.iter().rev().find_map(|entry| match entry {
            NarrativeEntry::Event(RunnerEvent::Final { text }) => Some(text.clone()),
            _ => None,
        })
    }

    /// Finds the `Action` a `Result` event's `tool_use_id` belongs to,
    /// so the posted activity names the original tool rather than the
    /// empty placeholder `from_runner_event` leaves for the caller to
    /// fill in.
    fn find_action(&self, tool_use_id: &str) -> Option<(String, Option<String>)> {
        self.session.narrative.iter().rev().find_map(|entry| match entry {
            NarrativeEntry::Event(RunnerEvent::Action { tool_use_id: id, name, detail }) if id == tool_use_id => {
                Some((name.clone(), detail.clone()))
            }
            _ => None,
        })
    }

    async fn post_formatted(&mut self, event: &RunnerEvent) {
        let content = match event {
            RunnerEvent::Result { tool_use_id, output, is_error } => {
                let (action, parameter) = self.find_action(tool_use_id).unwrap_or_default();
                let file_ext = parameter.as_deref().and_then(file_extension);
                ActivityContent::Result {
                    action,
                    parameter,
                    result: cyrus_adapters::format_result(file_ext.as_deref(), output),
                    is_error: *is_error,
                }
            }
            RunnerEvent::Action { detail, .. } => from_runner_event(event, detail.clone(), None),
            _ => from_runner_event(event, None, None),
        };
        self.post_activity(content, false).await;
    }

    async fn post_activity(&mut self, content: ActivityContent, ephemeral: bool) {
        let Some(agent_session_id) = self.session.tracker_session_id.clone() else {
            warn!(session_id = %self.session.id, "dropping activity post: no tracker session id yet");
            self.pending_posts.push((content, ephemeral));
            return;
        };
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.tracker.post_agent_activity(&agent_session_id, content.clone(), ephemeral).await {
                Ok(_) => return,
                Err(e) if attempt < MAX_POST_ATTEMPTS && e.is_transient() => {
                    warn!(session_id = %self.session.id, attempt, error = %e, "tracker activity post failed, retrying");
                    tokio::time::sleep(backoff_with_jitter(attempt)).await;
                }
                Err(e) => {
                    warn!(session_id = %self.session.id, error = %e, "buffering tracker activity post after exhausting retries");
                    self.pending_posts.push((content, ephemeral));
                    return;
                }
            }
        }
    }

    /// Re-attempts every buffered post, in order, dropping each one that
    /// finally succeeds. Called before a resumed session accepts new
    /// work (spec §4.7: "buffered events are re-attempted before
    /// accepting new work for that session").
    pub async fn flush_pending_posts(&mut self) {
        let pending = std::mem::take(&mut self.pending_posts);
        for (content, ephemeral) in pending {
            self.post_activity(content, ephemeral).await;
        }
    }
}

/// Recovers a file extension from a formatted action parameter (e.g.
/// `Read`'s `path` or `path:offset-limit`), so `format_result`'s
/// language inference (spec §4.6) has something to work from.
fn file_extension(parameter: &str) -> Option<String> {
    let path_part = parameter.split(':').next().unwrap_or(parameter);
    let ext = path_part.rsplit('.').next()?;
    (ext != path_part).then(|| ext.to_string())
}

/// Exponential backoff with a small jitter term, capped by
/// `MAX_POST_ATTEMPTS` retries (spec §5: "up to 3 attempts, exponential
/// backoff with jitter"). Jitter is derived from the wall clock rather
/// than a dedicated RNG dependency — good enough to de-correlate
/// concurrent sessions' retries without pulling in `rand`.
fn backoff_with_jitter(attempt: u32) -> Duration {
    let base_ms = 100u64 * 2u64.saturating_pow(attempt.saturating_sub(1));
    let jitter_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()) % 50)
        .unwrap_or(0);
    Duration::from_millis(base_ms + jitter_ms)
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
