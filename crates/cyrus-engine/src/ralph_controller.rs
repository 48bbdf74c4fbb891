// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires `cyrus_core::RalphState`'s three-conjunct continuation rule
//! into an actual restart decision for the coordinator (spec §4.4).

use cyrus_core::RalphState;

/// What the coordinator should do after a session's `Final` text is
/// known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RalphDecision {
    /// Restart a fresh session in the same workspace with this
    /// continuation prompt, reusing the runner's resume-session hint.
    Continue { prompt: String },
    /// No loop is active, or it just ended; post a terminal summary.
    Stop,
}

pub struct RalphWiggumController;

impl RalphWiggumController {
    /// Consult `ralph_state` with a completed session's final text and
    /// decide whether to continue the loop. Mutates `ralph_state` in
    /// place: advances `iteration` on continue, deactivates on stop.
    pub fn on_session_completed(ralph_state: &mut Option<RalphState>, final_text: &str) -> RalphDecision {
        let Some(state) = ralph_state else { return RalphDecision::Stop };
        if !state.should_continue(final_text) {
            state.deactivate();
            return RalphDecision::Stop;
        }
        RalphDecision::Continue { prompt: state.advance(final_text) }
    }
}

#[cfg(test)]
#[path = "ralph_controller_tests.rs"]
mod tests;
