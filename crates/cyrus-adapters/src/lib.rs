// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cyrus-adapters: the external capability seams the orchestration core
//! consumes (spec §6) — `Runner` (agent process control) and
//! `IssueTracker` (tracker RPCs) — plus the `RunnerEventNormalizer` that
//! turns heterogeneous vendor streams into the uniform `RunnerEvent`
//! shape (spec §4.6). Concrete vendor wrappers and the concrete tracker
//! transport are out of scope; this crate defines the seams and, behind
//! `test-support`, in-process test doubles for both.

pub mod normalizer;
pub mod process_runner;
pub mod runner;
pub mod tracker;

pub mod mock_runner;

#[cfg(any(test, feature = "test-support"))]
pub mod fake_tracker;

pub use normalizer::{
    format_edit_diff, format_mcp_tool_name, format_parameter, format_result,
    RunnerEventNormalizer, LAST_MESSAGE_MARKER,
};
pub use runner::{Runner, RunnerError, RunnerHandle, RunnerInput};
pub use tracker::{
    ActivityPosted, CreatedAgentSession, IssueData, IssueStateType, IssueTracker, TrackerError,
    UploadedFile,
};

pub use mock_runner::{MockRunner, MockRunnerCall};
pub use process_runner::{ProcessRunner, ProcessRunnerFactory, ProcessRunnerSpec};

#[cfg(any(test, feature = "test-support"))]
pub use fake_tracker::{FakeIssueTracker, TimelineEntry};
