// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk `edge-worker-state.json` document (spec §3/§6).

use crate::persistence::PersistenceStore;
use cyrus_core::{RunnerSelection, Session};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Current schema version. A loaded document whose `version` doesn't
/// match this is discarded with a warning, never migrated in place
/// (spec §3: "mismatched versions are discarded with a warning").
pub const CURRENT_STATE_VERSION: u32 = 2;

/// The inner `state` object of the persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateBody {
    /// All sessions known to the orchestrator, keyed by internal session id.
    #[serde(default)]
    pub agent_sessions: HashMap<String, Session>,
    /// Buffered narrative entries awaiting a retried tracker post, keyed
    /// by session id (spec §4.7: "the event is buffered in-memory and
    /// persisted with the session").
    #[serde(default)]
    pub agent_session_entries: HashMap<String, Vec<String>>,
    /// Ralph-loop child session id -> parent session id, so a crash
    /// mid-loop can still report the right lineage.
    #[serde(default)]
    pub child_to_parent_agent_session: HashMap<String, String>,
    /// Cache of issue id -> repository id, avoiding a re-route on
    /// every follow-up webhook for an issue already bound to a repo.
    #[serde(default)]
    pub issue_repository_cache: HashMap<String, String>,
    /// Per-session runner binding, independent of `agent_sessions` so it
    /// survives a session being pruned after drain.
    #[serde(default)]
    pub session_runner_selections: HashMap<String, RunnerSelection>,
    /// Sessions run by a non-Claude runner that has already reported
    /// completion out of band and should not be resumed.
    #[serde(default)]
    pub finalized_non_claude_sessions: HashSet<String>,
}

/// The full on-disk document: `{version, savedAt, state}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub saved_at: u64,
    pub state: StateBody,
}

impl PersistedState {
    pub fn new(saved_at: u64, state: StateBody) -> Self {
        Self { version: CURRENT_STATE_VERSION, saved_at, state }
    }

    pub fn is_current_version(&self) -> bool {
        self.version == CURRENT_STATE_VERSION
    }

    /// Load from `store`, discarding (and warning on) a version
    /// mismatch rather than attempting an in-place migration.
    pub fn load_from(store: &PersistenceStore) -> Option<Self> {
        let doc: PersistedState = store.load()?;
        if doc.is_current_version() {
            Some(doc)
        } else {
            warn!(
                path = %store.path().display(),
                found = doc.version,
                expected = CURRENT_STATE_VERSION,
                "discarding persisted state with mismatched version"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "persisted_state_tests.rs"]
mod tests;
