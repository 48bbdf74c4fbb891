// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Session` aggregate: one tracker-driven agent run, owned for its
//! entire lifetime by a single `SessionCoordinator`.

use crate::elicitation::Elicitation;
use crate::parallel::ParallelAgentGroup;
use crate::ralph::RalphState;
use crate::runner_event::RunnerEvent;
use crate::runner_selection::RunnerSelection;
use crate::state_machine::SessionStateMachine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

crate::define_id! {
    /// Internal session identifier, distinct from the tracker's own
    /// session id (`trackerSessionId` below).
    pub struct SessionId("sess-");
}

crate::define_id! {
    /// Identifier for a [`ParallelAgentGroup`].
    pub struct GroupId("grp-");
}

/// Number of narrative entries retained verbatim before older ones are
/// folded into a single rollup entry (see [`Session::record_event`]).
pub const NARRATIVE_CAP: usize = 500;

/// One already-posted runner event, or a summary standing in for a run
/// of entries that aged out past [`NARRATIVE_CAP`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NarrativeEntry {
    Event(RunnerEvent),
    /// Replaces `count` older entries that were trimmed to bound the
    /// persisted document's size.
    Rollup { count: usize },
}

/// A session's entire lifetime state, mutated only by its owning
/// coordinator task (see spec §5: no locks needed, single-task
/// ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub tracker_session_id: Option<String>,
    pub repository_id: String,
    pub issue_id: String,
    pub workspace_path: PathBuf,

    pub state_machine: SessionStateMachine,

    pub runner_selection: RunnerSelection,
    /// Narrative entries, oldest first; see [`NARRATIVE_CAP`].
    pub narrative: Vec<NarrativeEntry>,
    pub parallel_groups: HashMap<GroupId, ParallelAgentGroup>,
    pub ralph_state: Option<RalphState>,
    /// Elicitations awaiting a `response` activity, keyed by their id.
    #[serde(default)]
    pub pending_elicitations: HashMap<String, Elicitation>,

    pub started_at: u64,
    pub ended_at: Option<u64>,
    pub exit_code: Option<i32>,
    /// Truncated to 1500 characters, per spec §4.7 failure semantics.
    pub stderr_tail: Option<String>,
}

impl Session {
    pub fn new(
        repository_id: impl Into<String>,
        issue_id: impl Into<String>,
        workspace_path: PathBuf,
        runner_selection: RunnerSelection,
        started_at: u64,
    ) -> Self {
        let id = SessionId::new();
        Self {
            state_machine: SessionStateMachine::new(id.as_str()),
            id,
            tracker_session_id: None,
            repository_id: repository_id.into(),
            issue_id: issue_id.into(),
            workspace_path,
            runner_selection,
            narrative: Vec::new(),
            parallel_groups: HashMap::new(),
            ralph_state: None,
            pending_elicitations: HashMap::new(),
            started_at,
            ended_at: None,
            exit_code: None,
            stderr_tail: None,
        }
    }

    /// Append `event` to the narrative, folding the oldest entries into
    /// a rollup once the cap is exceeded.
    pub fn record_event(&mut self, event: RunnerEvent) {
        self.narrative.push(NarrativeEntry::Event(event));
        if self.narrative.len() > NARRATIVE_CAP {
            let has_rollup = matches!(self.narrative.first(), Some(NarrativeEntry::Rollup { .. }));
            let start = if has_rollup { 1 } else { 0 };
            let overflow = self.narrative.len() - NARRATIVE_CAP;
            let removed = self.narrative.drain(start..start + overflow).count();
            let prior = if has_rollup {
                match self.narrative.remove(0) {
                    NarrativeEntry::Rollup { count } => count,
                    NarrativeEntry::Event(_) => unreachable!(),
                }
            } else {
                0
            };
            self.narrative.insert(0, NarrativeEntry::Rollup { count: prior + removed });
        }
    }

    /// Truncate `stderr` output to the 1500-character tail, per spec §4.7.
    pub fn set_stderr_tail(&mut self, stderr: &str) {
        const MAX: usize = 1500;
        self.stderr_tail = Some(crate::id::short(stderr, MAX).to_string());
    }

    pub fn is_terminal(&self) -> bool {
        self.state_machine.is_terminal()
    }

    pub fn can_resume(&self) -> bool {
        self.state_machine.can_resume()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
