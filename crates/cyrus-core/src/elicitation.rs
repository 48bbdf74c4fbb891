// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Elicitation/response activity content.
//!
//! spec §6 names `elicitation`/`response` among `IssueTracker`'s
//! `postAgentActivity` content types but leaves their payload
//! undesigned. This generalizes the decision/question shape a runner
//! uses when a tool call needs user confirmation before it can proceed.

use serde::{Deserialize, Serialize};

/// One selectable option offered by an [`Elicitation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElicitationOption {
    pub label: String,
    pub value: String,
}

/// A question posted to the tracker that blocks a tool call until a
/// matching `response` activity arrives. Does not itself participate in
/// `SessionStateMachine` transitions — an outstanding elicitation never
/// blocks delivery of other `RunnerEvent`s to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elicitation {
    pub id: String,
    pub tool_use_id: String,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<ElicitationOption>,
}

impl Elicitation {
    pub fn new(id: impl Into<String>, tool_use_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self { id: id.into(), tool_use_id: tool_use_id.into(), prompt: prompt.into(), options: Vec::new() }
    }

    pub fn with_options(mut self, options: Vec<ElicitationOption>) -> Self {
        self.options = options;
        self
    }
}

/// The resolution of an outstanding [`Elicitation`]: either a chosen
/// option's value, or freeform text when the elicitation offered none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ElicitationResponse {
    ChosenValue { value: String },
    FreeText { message: String },
}

#[cfg(test)]
#[path = "elicitation_tests.rs"]
mod tests;
