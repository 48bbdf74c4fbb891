// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process `Runner` test double. Never spawns a real process; plays
//! back a scripted event sequence and records every call it receives
//! for assertions.

use crate::runner::{Runner, RunnerError, RunnerHandle, RunnerInput};
use async_trait::async_trait;
use cyrus_core::RunnerEvent;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One call observed by a [`MockRunner`], in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum MockRunnerCall {
    Started { resume_session_id: Option<String> },
    PushMessage(String),
    CompleteStream,
    Stopped,
}

/// Scripted [`Runner`] implementation for coordinator/engine tests.
pub struct MockRunner {
    script: Vec<RunnerEvent>,
    streaming: bool,
    calls: Arc<Mutex<Vec<MockRunnerCall>>>,
    session_id: Option<String>,
}

impl MockRunner {
    /// A runner that emits `script` in order as soon as it starts.
    pub fn new(script: Vec<RunnerEvent>) -> Self {
        Self { script, streaming: false, calls: Arc::new(Mutex::new(Vec::new())), session_id: None }
    }

    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn calls(&self) -> Vec<MockRunnerCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Runner for MockRunner {
    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    async fn start(
        &self,
        _input: RunnerInput,
        resume_session_id: Option<String>,
        on_event: mpsc::Sender<RunnerEvent>,
    ) -> Result<RunnerHandle, RunnerError> {
        self.calls.lock().push(MockRunnerCall::Started { resume_session_id });
        for event in &self.script {
            // A closed receiver means the coordinator already stopped
            // listening; nothing further to do.
            if on_event.send(event.clone()).await.is_err() {
                break;
            }
        }
        Ok(RunnerHandle { session_id: self.session_id.clone() })
    }

    async fn push_message(&self, text: &str) -> Result<(), RunnerError> {
        if !self.streaming {
            return Err(RunnerError::NotStreaming);
        }
        self.calls.lock().push(MockRunnerCall::PushMessage(text.to_string()));
        Ok(())
    }

    async fn complete_stream(&self) -> Result<(), RunnerError> {
        self.calls.lock().push(MockRunnerCall::CompleteStream);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RunnerError> {
        self.calls.lock().push(MockRunnerCall::Stopped);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_runner_tests.rs"]
mod tests;
