// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session lifecycle state machine.
//!
//! `Created → Starting → Running → (Stopping|Completing) → (Stopped|Completed|Failed)`,
//! with `Error` reachable from any non-terminal state and `Resume` taking a
//! `Stopped` session back to `Starting`. See spec §4.5 for the full
//! transition table this module implements verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
    Completing,
    Completed,
    Failed,
}

crate::simple_display! {
    SessionStatus {
        Created => "created",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Completing => "completing",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Tracker-visible status, coarser than [`SessionStatus`] (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerVisibleStatus {
    Pending,
    Active,
    Stale,
    Complete,
    Error,
}

impl From<SessionStatus> for TrackerVisibleStatus {
    fn from(s: SessionStatus) -> Self {
        match s {
            SessionStatus::Created => TrackerVisibleStatus::Pending,
            SessionStatus::Starting
            | SessionStatus::Running
            | SessionStatus::Stopping
            | SessionStatus::Completing => TrackerVisibleStatus::Active,
            SessionStatus::Stopped => TrackerVisibleStatus::Stale,
            SessionStatus::Completed => TrackerVisibleStatus::Complete,
            SessionStatus::Failed => TrackerVisibleStatus::Error,
        }
    }
}

/// Events that drive state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    InitializeRunner,
    RunnerInitialized,
    MessageReceived,
    ResultReceived,
    CleanupComplete,
    StopSignal,
    RunnerStopped,
    Error,
    Resume,
}

crate::simple_display! {
    SessionEvent {
        InitializeRunner => "initialize_runner",
        RunnerInitialized => "runner_initialized",
        MessageReceived => "message_received",
        ResultReceived => "result_received",
        CleanupComplete => "cleanup_complete",
        StopSignal => "stop_signal",
        RunnerStopped => "runner_stopped",
        Error => "error",
        Resume => "resume",
    }
}

/// A state machine event rejected in strict mode, or returned by the
/// lenient `try_apply` path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid transition: {event} is not valid from {current_state}")]
pub struct InvalidTransition {
    pub session_id: String,
    pub current_state: SessionStatus,
    pub event: SessionEvent,
}

/// One recorded transition, for debugging and crash-forensics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: SessionStatus,
    pub to: SessionStatus,
    pub event_name: String,
    pub at_epoch_ms: u64,
}

/// Maximum number of transitions retained in `history` before the oldest
/// are dropped (a session that loops `MessageReceived` thousands of times
/// should not grow this list unboundedly).
pub const MAX_HISTORY: usize = 200;

/// Per-session lifecycle state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateMachine {
    pub session_id: String,
    status: SessionStatus,
    #[serde(default)]
    history: Vec<TransitionRecord>,
}

/// Serializable snapshot used to reconstruct a machine across a restart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStateSnapshot {
    pub session_id: String,
    pub status: SessionStatus,
}

impl SessionStateMachine {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), status: SessionStatus::Created, history: Vec::new() }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Starting | SessionStatus::Running | SessionStatus::Completing
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn can_resume(&self) -> bool {
        self.status == SessionStatus::Stopped
    }

    pub fn tracker_status(&self) -> TrackerVisibleStatus {
        self.status.into()
    }

    /// Look up the next state for `(current, event)`, without mutating.
    fn next_state(current: SessionStatus, event: SessionEvent) -> Option<SessionStatus> {
        use SessionEvent::*;
        use SessionStatus::*;
        match (current, event) {
            (Created, InitializeRunner) => Some(Starting),
            (Stopped, InitializeRunner) => Some(Starting),
            (Starting, RunnerInitialized) => Some(Running),
            (Running, MessageReceived) => Some(Running),
            (Running, ResultReceived) => Some(Completing),
            (Completing, CleanupComplete) => Some(Completed),
            (Running, StopSignal) => Some(Stopping),
            (Stopping, RunnerStopped) => Some(Stopped),
            (Created | Starting | Running | Completing | Stopping, Error) => Some(Failed),
            (Stopped, Resume) => Some(Starting),
            _ => None,
        }
    }

    /// Apply `event`, raising [`InvalidTransition`] if it is not legal
    /// from the current state ("strict" mode per spec §4.5).
    pub fn apply(&mut self, event: SessionEvent, now_epoch_ms: u64) -> Result<SessionStatus, InvalidTransition> {
        match Self::next_state(self.status, event) {
            Some(next) => {
                self.record(next, event, now_epoch_ms);
                Ok(next)
            }
            None => Err(InvalidTransition {
                session_id: self.session_id.clone(),
                current_state: self.status,
                event,
            }),
        }
    }

    /// Apply `event`, returning `false` without mutating state if it is
    /// not legal from the current state ("lenient" mode per spec §4.5).
    pub fn try_apply(&mut self, event: SessionEvent, now_epoch_ms: u64) -> bool {
        match Self::next_state(self.status, event) {
            Some(next) => {
                self.record(next, event, now_epoch_ms);
                true
            }
            None => false,
        }
    }

    fn record(&mut self, next: SessionStatus, event: SessionEvent, at_epoch_ms: u64) {
        self.history.push(TransitionRecord {
            from: self.status,
            to: next,
            event_name: event.to_string(),
            at_epoch_ms,
        });
        if self.history.len() > MAX_HISTORY {
            let overflow = self.history.len() - MAX_HISTORY;
            self.history.drain(0..overflow);
        }
        self.status = next;
    }

    pub fn to_snapshot(&self) -> SessionStateSnapshot {
        SessionStateSnapshot { session_id: self.session_id.clone(), status: self.status }
    }

    /// Reconstruct a machine from a persisted snapshot. Per spec §4.9, a
    /// session recovered as non-terminal on startup is reconstructed in
    /// `Stopped` regardless of the snapshot's recorded status, so that a
    /// subsequent tracker prompt can drive it through `Resume` rather than
    /// silently auto-resuming.
    pub fn from_snapshot_dormant(snapshot: SessionStateSnapshot) -> Self {
        let status = if matches!(snapshot.status, SessionStatus::Completed | SessionStatus::Failed)
        {
            snapshot.status
        } else {
            SessionStatus::Stopped
        };
        Self { session_id: snapshot.session_id, status, history: Vec::new() }
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
