// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate view of non-terminal sessions, exposed via the `/status`
//! endpoint and persisted separately for crash recovery (spec §3, §6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary of one active session, as shown by `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessionSummary {
    pub issue_id: String,
    pub issue_identifier: String,
    pub repository_id: String,
    pub started_at: u64,
}

/// Aggregate status document. Derived from the orchestrator's session
/// registry; never hand-constructed field by field outside tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWorkStatus {
    pub is_working: bool,
    pub active_sessions: HashMap<String, ActiveSessionSummary>,
    pub last_updated: u64,
}

impl ActiveWorkStatus {
    pub fn empty(now_epoch_ms: u64) -> Self {
        Self { is_working: false, active_sessions: HashMap::new(), last_updated: now_epoch_ms }
    }

    pub fn from_sessions(
        sessions: impl IntoIterator<Item = (String, ActiveSessionSummary)>,
        now_epoch_ms: u64,
    ) -> Self {
        let active_sessions: HashMap<_, _> = sessions.into_iter().collect();
        Self { is_working: !active_sessions.is_empty(), active_sessions, last_updated: now_epoch_ms }
    }
}

#[cfg(test)]
#[path = "active_work_tests.rs"]
mod tests;
