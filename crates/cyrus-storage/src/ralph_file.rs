// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ralph-loop.local.md`, written per-workspace so the loop state is
//! visible next to the code it's iterating on (spec §6).

use cyrus_core::RalphState;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RalphFileError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const FILE_NAME: &str = "ralph-loop.local.md";
const STATE_FENCE: &str = "```json ralph-state";

/// Render `state` as a human-readable markdown document with a fenced
/// JSON block carrying the structured state, and write it atomically
/// into `workspace_path`.
pub fn write(workspace_path: &Path, state: &RalphState) -> Result<(), RalphFileError> {
    let path = workspace_path.join(FILE_NAME);
    let json = serde_json::to_string_pretty(state).unwrap_or_default();
    let phrase = state.completion_phrase.as_deref().unwrap_or("(none)");
    let body = format!(
        "# Ralph Wiggum loop\n\n\
         - active: {}\n\
         - iteration: {} / {}\n\
         - completion phrase: {}\n\n\
         {STATE_FENCE}\n{json}\n```\n",
        state.active,
        state.iteration,
        if state.max_iterations == 0 { "unlimited".to_string() } else { state.max_iterations.to_string() },
        phrase,
    );

    let tmp_path = path.with_extension("md.tmp");
    let mut file =
        fs::File::create(&tmp_path).map_err(|source| RalphFileError::Io { path: tmp_path.clone(), source })?;
    file.write_all(body.as_bytes()).map_err(|source| RalphFileError::Io { path: tmp_path.clone(), source })?;
    file.sync_all().map_err(|source| RalphFileError::Io { path: tmp_path.clone(), source })?;
    drop(file);
    fs::rename(&tmp_path, &path).map_err(|source| RalphFileError::Io { path: path.clone(), source })?;
    Ok(())
}

/// Recover `RalphState` from the fenced JSON block, if the file exists
/// and parses; `None` otherwise (no loop was in progress).
pub fn read(workspace_path: &Path) -> Option<RalphState> {
    let path = workspace_path.join(FILE_NAME);
    let contents = fs::read_to_string(path).ok()?;
    let start = contents.find(STATE_FENCE)? + STATE_FENCE.len();
    let rest = &contents[start..];
    let end = rest.find("```")?;
    serde_json::from_str(rest[..end].trim()).ok()
}

#[cfg(test)]
#[path = "ralph_file_tests.rs"]
mod tests;
