// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Runner` capability set the orchestration core consumes (spec
//! §6). Concrete vendor wrappers (Claude/Codex/OpenCode/Gemini CLIs)
//! are out of scope for this crate; it defines the seam and a
//! `MockRunner` test double.

use async_trait::async_trait;
use cyrus_core::RunnerEvent;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("runner failed to start: {0}")]
    SpawnFailed(String),
    #[error("runner does not support streaming input")]
    NotStreaming,
    #[error("runner process exited with status {0}")]
    ProcessExit(i32),
}

/// What a runner was started with.
pub enum RunnerInput {
    /// Single-shot prompt; the runner process is given the whole
    /// prompt up front and streaming follow-ups are rejected.
    Prompt(String),
    /// Streaming-input mode: the first message to send once the runner
    /// signals it is ready. Subsequent messages go through
    /// [`Runner::push_message`].
    StreamingInitial(String),
}

/// Handle returned by [`Runner::start`].
#[derive(Debug, Clone, Default)]
pub struct RunnerHandle {
    /// Vendor-assigned session id, when the runner exposes one (used
    /// as a `resumeSessionId` hint for a later restart).
    pub session_id: Option<String>,
}

/// Uniform start/stop/stream-input operations over an external agent
/// runner process.
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    /// Whether this runner supports [`Runner::push_message`]/
    /// [`Runner::complete_stream`] after `start`.
    fn supports_streaming(&self) -> bool;

    /// Start the runner, emitting normalized events on `on_event` as
    /// they arrive. Returns once the runner has initialized (not once
    /// it has finished).
    async fn start(
        &self,
        input: RunnerInput,
        resume_session_id: Option<String>,
        on_event: mpsc::Sender<RunnerEvent>,
    ) -> Result<RunnerHandle, RunnerError>;

    /// Send a follow-up message to a streaming-mode runner.
    async fn push_message(&self, text: &str) -> Result<(), RunnerError> {
        let _ = text;
        Err(RunnerError::NotStreaming)
    }

    /// Signal no further input is coming on a streaming-mode runner.
    async fn complete_stream(&self) -> Result<(), RunnerError> {
        Ok(())
    }

    /// Cooperative abort; the runner should exit promptly but may take
    /// up to the coordinator's grace window.
    async fn stop(&self) -> Result<(), RunnerError>;
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
