// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the `runner_factory` closure `Orchestrator::new` takes
//! (spec §6): given a `RunnerSelection`, produce the `Arc<dyn Runner>`
//! a new or resumed session should drive. Concrete vendor CLIs
//! (Claude/Codex/OpenCode/Gemini) are out of scope for this workspace
//! (spec §1); each is wired to a `ProcessRunner` if an operator has set
//! the corresponding `CYRUS_RUNNER_<TYPE>_CMD` env var, and otherwise
//! falls back to `MockRunner` with a warning — keeping the daemon
//! runnable out of the box without fabricating a vendor integration.

use cyrus_adapters::{MockRunner, ProcessRunner, ProcessRunnerSpec, Runner};
use cyrus_core::{RunnerSelection, RunnerType};
use std::sync::Arc;
use tracing::warn;

fn env_command(runner_type: RunnerType) -> Option<(String, Vec<String>)> {
    let var = match runner_type {
        RunnerType::Claude => "CYRUS_RUNNER_CLAUDE_CMD",
        RunnerType::Codex => "CYRUS_RUNNER_CODEX_CMD",
        RunnerType::Opencode => "CYRUS_RUNNER_OPENCODE_CMD",
        RunnerType::Gemini => "CYRUS_RUNNER_GEMINI_CMD",
        RunnerType::Mock => return None,
    };
    let raw = std::env::var(var).ok()?;
    let mut parts = raw.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Build the `Fn(&RunnerSelection) -> Arc<dyn Runner>` closure
/// `Orchestrator::new` wants. `workspace_base_dir` is used as the
/// `ProcessRunner`'s working directory when no session-specific
/// workspace is known yet at construction time (the coordinator's own
/// `Session::workspace_path` is the source of truth once a session
/// exists; this closure only chooses which adapter to use).
pub fn build_runner_factory(
    workspace_base_dir: std::path::PathBuf,
) -> Arc<dyn Fn(&RunnerSelection) -> Arc<dyn Runner> + Send + Sync> {
    Arc::new(move |selection: &RunnerSelection| -> Arc<dyn Runner> {
        if let Some((program, args)) = env_command(selection.runner_type) {
            return Arc::new(ProcessRunner::new(ProcessRunnerSpec {
                program,
                args,
                cwd: workspace_base_dir.clone(),
                streaming: true,
            }));
        }
        if !matches!(selection.runner_type, RunnerType::Mock) {
            warn!(runner_type = %selection.runner_type, "no command configured for this runner type; falling back to MockRunner");
        }
        Arc::new(MockRunner::new(Vec::new()).streaming())
    })
}

#[cfg(test)]
#[path = "runner_wiring_tests.rs"]
mod tests;
