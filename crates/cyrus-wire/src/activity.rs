// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shape for `IssueTracker::postAgentActivity` (spec §6).

use cyrus_core::{Elicitation, ElicitationResponse, RunnerEvent};
use serde::{Deserialize, Serialize};

/// One activity to post to the tracker for a given `agentSessionId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum ActivityContent {
    Prompt { body: String },
    Thought { body: String },
    Action { action: String, parameter: Option<String> },
    Result { action: String, parameter: Option<String>, result: String, is_error: bool },
    Error { body: String },
    Elicitation(Elicitation),
    Response(ElicitationResponse),
}

impl ActivityContent {
    /// True when this content type replaces any previous ephemeral
    /// activity on the session rather than appending (spec §6 semantics
    /// note); the caller still threads the `ephemeral` flag separately.
    pub fn is_replayable_as_ephemeral(&self) -> bool {
        matches!(self, ActivityContent::Action { .. } | ActivityContent::Thought { .. })
    }
}

/// Build the activity content for one normalized runner event, given
/// the already-formatted parameter/result strings (produced by
/// `cyrus_adapters::normalizer`'s per-tool formatters).
pub fn from_runner_event(
    event: &RunnerEvent,
    formatted_parameter: Option<String>,
    formatted_result: Option<String>,
) -> ActivityContent {
    match event {
        RunnerEvent::Thought { text } => ActivityContent::Thought { body: text.clone() },
        RunnerEvent::Action { name, .. } => {
            ActivityContent::Action { action: name.clone(), parameter: formatted_parameter }
        }
        RunnerEvent::Result { is_error, .. } => ActivityContent::Result {
            action: String::new(),
            parameter: formatted_parameter,
            result: formatted_result.unwrap_or_default(),
            is_error: *is_error,
        },
        RunnerEvent::Error { err } => ActivityContent::Error { body: err.clone() },
        // The canonical final response is still textual narration from the
        // runner's point of view; it is distinguished from intermediate
        // `Thought`s by the caller (narrative/Ralph-loop logic), not by a
        // separate wire content type.
        RunnerEvent::Final { text } => ActivityContent::Thought { body: text.clone() },
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
