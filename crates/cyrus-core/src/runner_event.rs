// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform event stream emitted by runner adapters.

use serde::{Deserialize, Serialize};

/// A single normalized event produced by a runner adapter.
///
/// Each variant corresponds to one tracker activity content type; see
/// `cyrus_adapters::normalizer` for the code that turns raw vendor
/// streams into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RunnerEvent {
    /// Freeform reasoning/narration text from the model.
    Thought { text: String },
    /// A tool invocation.
    Action {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
        /// Identifies the tool-use block this action belongs to, so a
        /// later `Result` can be matched back to it.
        tool_use_id: String,
    },
    /// The output of a tool invocation.
    Result {
        tool_use_id: String,
        output: String,
        is_error: bool,
    },
    /// A runner-level error not tied to a specific tool call.
    Error { err: String },
    /// The canonical final response for the turn/session.
    Final { text: String },
}

impl RunnerEvent {
    /// Whether this event ends the runner's current turn (not the whole
    /// session — `Final` still allows a subsequent streamed follow-up).
    pub fn is_final(&self) -> bool {
        matches!(self, RunnerEvent::Final { .. })
    }

    pub fn tool_use_id(&self) -> Option<&str> {
        match self {
            RunnerEvent::Action { tool_use_id, .. } => Some(tool_use_id),
            RunnerEvent::Result { tool_use_id, .. } => Some(tool_use_id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "runner_event_tests.rs"]
mod tests;
