// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic subprocess-backed [`Runner`]. Concrete vendor wrappers
//! (Claude/Codex/OpenCode/Gemini CLIs) are out of scope (spec §1); this
//! adapter instead spawns *any* configured command and expects it to
//! speak one JSON-encoded [`WireEvent`] per line on stdout — the raw,
//! pre-normalization shape `RunnerEventNormalizer` (spec §4.6) is built
//! to consume — so a deployment can point it at whatever vendor wrapper
//! it has without this crate knowing vendor specifics. The
//! process-spawn/reap/stdin-pipe shape is grounded on the teacher's
//! `crates/daemon/src/adapters/agent/coop/spawn.rs`.

use crate::normalizer::{format_edit_diff, format_mcp_tool_name, format_parameter, RunnerEventNormalizer};
use crate::runner::{Runner, RunnerError, RunnerHandle, RunnerInput};
use async_trait::async_trait;
use cyrus_core::RunnerEvent;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// One line of the subprocess wire format: a cumulative text snapshot
/// keyed by part id, or a raw tool call/result carrying the unformatted
/// input/output the normalizer turns into a parameter string, an MCP
/// display name, or a reconstructed diff (spec §4.6).
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireEvent {
    Text { part_id: String, text: String },
    ToolUse { tool_use_id: String, name: String, #[serde(default)] input: Value },
    ToolResult { tool_use_id: String, output: String, #[serde(default)] is_error: bool },
    Error { err: String },
}

/// Turns one raw `tool_use` wire line into the normalized `Action`,
/// applying diff reconstruction for `Edit` calls, MCP tool name
/// rendering, and per-tool parameter formatting (spec §4.6).
fn build_action(tool_use_id: String, name: String, input: Value) -> RunnerEvent {
    let detail = if name == "Edit" {
        let file_path = input.get("file_path").and_then(Value::as_str).unwrap_or_default();
        let old_string = input.get("old_string").and_then(Value::as_str).unwrap_or_default();
        let new_string = input.get("new_string").and_then(Value::as_str).unwrap_or_default();
        Some(format_edit_diff(file_path, old_string, new_string))
    } else {
        format_parameter(&name, &input)
    };
    let name = format_mcp_tool_name(&name).unwrap_or(name);
    RunnerEvent::Action { name, detail, tool_use_id }
}

/// How to invoke the external runner process.
#[derive(Debug, Clone)]
pub struct ProcessRunnerSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// The runner supports streaming follow-ups over its stdin pipe
    /// (newline-delimited JSON `{"type":"message","text":...}`).
    pub streaming: bool,
}

/// Spawns `spec.program` with `spec.args`, writes the prompt to stdin
/// (once, unless `streaming`), and parses each stdout line as a
/// [`WireEvent`], running it through a `RunnerEventNormalizer` before
/// forwarding the normalized `RunnerEvent`s on the caller's channel.
/// Lines that don't parse are folded into an `Error` event rather than
/// dropped silently, so a misbehaving external process is still
/// visible in the session narrative.
pub struct ProcessRunner {
    spec: ProcessRunnerSpec,
    child: Mutex<Option<Child>>,
}

impl ProcessRunner {
    pub fn new(spec: ProcessRunnerSpec) -> Self {
        Self { spec, child: Mutex::new(None) }
    }
}

#[async_trait]
impl Runner for ProcessRunner {
    fn supports_streaming(&self) -> bool {
        self.spec.streaming
    }

    async fn start(
        &self,
        input: RunnerInput,
        resume_session_id: Option<String>,
        on_event: mpsc::Sender<RunnerEvent>,
    ) -> Result<RunnerHandle, RunnerError> {
        let mut command = Command::new(&self.spec.program);
        command.args(&self.spec.args).current_dir(&self.spec.cwd);
        if let Some(ref resume) = resume_session_id {
            command.arg("--resume-session").arg(resume);
        }
        command
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let mut child =
            command.spawn().map_err(|e| RunnerError::SpawnFailed(format!("{}: {e}", self.spec.program)))?;

        let initial = match input {
            RunnerInput::Prompt(text) => text,
            RunnerInput::StreamingInitial(text) => text,
        };
        if let Some(mut stdin) = child.stdin.take() {
            let line = format!("{initial}\n");
            let _ = stdin.write_all(line.as_bytes()).await;
            if !self.spec.streaming {
                drop(stdin);
            } else {
                // Hand the pipe back so later `push_message` calls can use it.
                child.stdin = Some(stdin);
            }
        }

        let stdout = child.stdout.take().ok_or_else(|| RunnerError::SpawnFailed("no stdout pipe".into()))?;
        tokio::spawn(async move {
            let mut normalizer = RunnerEventNormalizer::new();
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => {
                        let to_send = match serde_json::from_str::<WireEvent>(&line) {
                            Ok(WireEvent::Text { part_id, text }) => {
                                normalizer.feed_text_snapshot(&part_id, &text).into_iter().collect()
                            }
                            Ok(WireEvent::ToolUse { tool_use_id, name, input }) => {
                                normalizer.feed_non_text(build_action(tool_use_id, name, input))
                            }
                            Ok(WireEvent::ToolResult { tool_use_id, output, is_error }) => {
                                normalizer.feed_non_text(RunnerEvent::Result { tool_use_id, output, is_error })
                            }
                            Ok(WireEvent::Error { err }) => normalizer.feed_non_text(RunnerEvent::Error { err }),
                            Err(e) => normalizer
                                .feed_non_text(RunnerEvent::Error { err: format!("unparseable runner output: {e}: {line}") }),
                        };
                        for event in to_send {
                            if on_event.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(None) => {
                        if let Some(event) = normalizer.flush_on_completion() {
                            let _ = on_event.send(event).await;
                        }
                        break;
                    }
                    Err(e) => {
                        let _ = on_event.send(RunnerEvent::Error { err: format!("reading runner stdout: {e}") }).await;
                        break;
                    }
                }
            }
        });

        let handle = RunnerHandle { session_id: None };
        *self.child.lock() = Some(child);
        Ok(handle)
    }

    async fn push_message(&self, text: &str) -> Result<(), RunnerError> {
        if !self.spec.streaming {
            return Err(RunnerError::NotStreaming);
        }
        let stdin = {
            let mut guard = self.child.lock();
            guard.as_mut().and_then(|c| c.stdin.take())
        };
        let Some(mut stdin) = stdin else { return Err(RunnerError::NotStreaming) };
        let line = format!("{text}\n");
        let result = stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| RunnerError::SpawnFailed(format!("writing to runner stdin: {e}")));
        if let Some(child) = self.child.lock().as_mut() {
            child.stdin = Some(stdin);
        }
        result
    }

    async fn complete_stream(&self) -> Result<(), RunnerError> {
        if let Some(child) = self.child.lock().as_mut() {
            child.stdin = None;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), RunnerError> {
        let child = self.child.lock().take();
        if let Some(mut child) = child {
            let _ = child.start_kill();
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessRunnerFactory {
    specs_by_program: Arc<Vec<(cyrus_core::RunnerType, ProcessRunnerSpec)>>,
}

impl ProcessRunnerFactory {
    pub fn new(specs: Vec<(cyrus_core::RunnerType, ProcessRunnerSpec)>) -> Self {
        Self { specs_by_program: Arc::new(specs) }
    }

    pub fn build(&self, runner_type: cyrus_core::RunnerType, workspace_path: &std::path::Path) -> Option<ProcessRunner> {
        self.specs_by_program.iter().find(|(ty, _)| *ty == runner_type).map(|(_, spec)| {
            let mut spec = spec.clone();
            spec.cwd = workspace_path.to_path_buf();
            ProcessRunner::new(spec)
        })
    }
}

#[cfg(test)]
#[path = "process_runner_tests.rs"]
mod tests;
