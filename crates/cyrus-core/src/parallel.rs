// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracking state for a detected fan-out of `Task` sub-agent calls
//! within a single assistant turn (spec §4.3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-sub-agent progress within a [`ParallelAgentGroup`], keyed by the
/// sub-agent's `toolUseId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelAgentProgress {
    pub description: String,
    pub tool_count: u32,
    pub current_action: Option<String>,
    pub completed: bool,
    pub result: Option<String>,
}

impl ParallelAgentProgress {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            tool_count: 0,
            current_action: None,
            completed: false,
            result: None,
        }
    }
}

/// A detected burst of `Task` tool-use calls, collapsed into a single
/// replacing ephemeral activity until every member agent reports its
/// result.
///
/// Invariant: at most one create is in flight at a time — tracked by
/// `ephemeral_activity_pending`, set synchronously on first detection
/// (before the asynchronous tracker create completes) so a racing
/// coordinator task cannot start a duplicate ephemeral activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelAgentGroup {
    pub created_at: u64,
    pub ephemeral_activity_id: Option<String>,
    pub ephemeral_activity_pending: bool,
    pub agents: HashMap<String, ParallelAgentProgress>,
}

impl ParallelAgentGroup {
    pub fn new(created_at: u64) -> Self {
        Self {
            created_at,
            ephemeral_activity_id: None,
            ephemeral_activity_pending: true,
            agents: HashMap::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.agents.is_empty() && self.agents.values().all(|a| a.completed)
    }

    /// Render the fixed-format tree described by spec §4.3: a header
    /// line followed by one line per sub-agent.
    pub fn render(&self) -> String {
        let total = self.agents.len();
        let done = self.agents.values().filter(|a| a.completed).count();
        let mut out = if done == total {
            format!("Completed {total} agents")
        } else {
            format!("Running {done} of {total} agents…")
        };
        let mut agents: Vec<_> = self.agents.values().collect();
        agents.sort_by(|a, b| a.description.cmp(&b.description));
        for agent in agents {
            let glyph = if agent.completed { "✅" } else { "🔄" };
            out.push_str(&format!("\n{glyph} {} ({} tools)", agent.description, agent.tool_count));
            if let Some(action) = &agent.current_action {
                if !agent.completed {
                    out.push_str(&format!("\n    {action}"));
                }
            }
        }
        out
    }

    /// A group is stale (per the periodic one-hour cleanup sweep) once
    /// its age exceeds `max_age_secs`.
    pub fn is_stale(&self, now_epoch_s: u64, max_age_secs: u64) -> bool {
        now_epoch_s.saturating_sub(self.created_at) > max_age_secs
    }
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
