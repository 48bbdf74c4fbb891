// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Each crate defines its own `thiserror`-derived error type at the
//! boundary it owns; this module supplies the cross-cutting
//! classification so callers can branch on recoverability without
//! matching every concrete error variant in every crate.

/// Recoverability classification for an error, independent of which
/// crate produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Schema or semantic validation of config/webhook payload failed.
    /// Non-retriable; the offending field should be named in the message.
    InvalidConfig,
    /// Tracker API returned 401, or webhook signature/token was invalid.
    /// Isolated per-repository; never takes the process down.
    AuthenticationFailure,
    /// Tracker/runner RPC timeout or 5xx. Retried with backoff + jitter.
    TransientIo,
    /// State machine event not legal in the current state.
    InvalidTransition,
    /// Runner exited 143 or aborted cooperatively. Session moves to Stopped.
    RunnerAborted,
    /// Runner process exited non-zero for a reason other than abort.
    /// Session moves to Failed; stderr tail is posted.
    RunnerProcessExit,
    /// No repository matched an inbound webhook event.
    RoutingFailure,
}

impl ErrorKind {
    /// Whether the caller should retry the operation that produced this
    /// error without operator intervention.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::TransientIo)
    }

    /// Whether this error should drive the owning session to a terminal
    /// `Failed` state rather than being absorbed locally.
    pub fn is_session_terminal(self) -> bool {
        matches!(self, ErrorKind::RunnerProcessExit)
    }
}

crate::simple_display! {
    ErrorKind {
        InvalidConfig => "invalid_config",
        AuthenticationFailure => "authentication_failure",
        TransientIo => "transient_io",
        InvalidTransition => "invalid_transition",
        RunnerAborted => "runner_aborted",
        RunnerProcessExit => "runner_process_exit",
        RoutingFailure => "routing_failure",
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
