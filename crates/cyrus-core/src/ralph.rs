// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ralph Wiggum iterative-loop state (spec §4.4): re-running a session
//! against its own prior output until a completion phrase appears or an
//! iteration cap is hit.

use serde::{Deserialize, Serialize};

/// Default iteration cap when a `ralph-wiggum` label carries no `-N`
/// suffix.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Persisted loop state, carried on [`crate::session::Session::ralph_state`]
/// and mirrored to `ralph-loop.local.md` in the session's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RalphState {
    pub active: bool,
    pub iteration: u32,
    /// 0 means unlimited.
    pub max_iterations: u32,
    pub completion_phrase: Option<String>,
    pub original_prompt: String,
}

impl RalphState {
    /// `iteration` starts at 1, counting the session's initial run
    /// against `max_iterations` — otherwise a `max_iterations=3` loop
    /// would start the runner 4 times (the uncounted initial run plus
    /// 3 counted continuations).
    pub fn new(original_prompt: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            active: true,
            iteration: 1,
            max_iterations,
            completion_phrase: None,
            original_prompt: original_prompt.into(),
        }
    }

    /// Parse a `ralph-wiggum` or `ralph-wiggum-N` label into a loop
    /// state, if `labels` contains one. `N` defaults to
    /// [`DEFAULT_MAX_ITERATIONS`] when absent or unparseable.
    pub fn from_labels(labels: &[String], original_prompt: impl Into<String>) -> Option<Self> {
        let label = labels.iter().find(|l| l.as_str() == "ralph-wiggum" || l.starts_with("ralph-wiggum-"))?;
        let max_iterations = label
            .strip_prefix("ralph-wiggum-")
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ITERATIONS);
        Some(Self::new(original_prompt, max_iterations))
    }

    /// Whether the loop should continue given the session's final text,
    /// per spec §4.4's three conjuncts.
    pub fn should_continue(&self, final_text: &str) -> bool {
        if !self.active {
            return false;
        }
        if self.max_iterations != 0 && self.iteration >= self.max_iterations {
            return false;
        }
        if let Some(phrase) = &self.completion_phrase {
            if final_text.to_lowercase().contains(&phrase.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Build the next iteration's continuation prompt, referencing the
    /// previous iteration and the original goal, and advance the
    /// iteration counter.
    pub fn advance(&mut self, previous_final_text: &str) -> String {
        self.iteration += 1;
        format!(
            "Continuing iteration {} of the original goal:\n\n{}\n\nPrevious iteration's output:\n\n{}",
            self.iteration, self.original_prompt, previous_final_text,
        )
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
#[path = "ralph_tests.rs"]
mod tests;
