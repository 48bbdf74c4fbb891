// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Which runner backend and model a tracker session is bound to.

use serde::{Deserialize, Serialize};

/// The kind of external agent runner process backing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerType {
    Claude,
    Codex,
    Opencode,
    Gemini,
    /// In-process test double; never spawns a real process.
    Mock,
}

crate::simple_display! {
    RunnerType {
        Claude => "claude",
        Codex => "codex",
        Opencode => "opencode",
        Gemini => "gemini",
        Mock => "mock",
    }
}

/// Persisted per-tracker-session runner binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSelection {
    pub issue_id: String,
    pub runner_type: RunnerType,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub fallback_model: Option<String>,
    #[serde(default)]
    pub resume_session_id: Option<String>,
}

impl RunnerSelection {
    pub fn new(issue_id: impl Into<String>, runner_type: RunnerType) -> Self {
        Self {
            issue_id: issue_id.into(),
            runner_type,
            model: None,
            fallback_model: None,
            resume_session_id: None,
        }
    }

    pub fn with_resume(mut self, resume_session_id: impl Into<String>) -> Self {
        self.resume_session_id = Some(resume_session_id.into());
        self
    }
}

#[cfg(test)]
#[path = "runner_selection_tests.rs"]
mod tests;
