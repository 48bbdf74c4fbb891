// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cyrus_core::RalphState;
use tempfile::tempdir;

#[test]
fn write_then_read_round_trips_state() {
    let dir = tempdir().unwrap();
    let mut state = RalphState::new("fix the bug across the codebase", 5);
    state.iteration = 2;
    state.completion_phrase = Some("all tests pass".into());

    write(dir.path(), &state).unwrap();
    let loaded = read(dir.path()).unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn read_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    assert!(read(dir.path()).is_none());
}

#[test]
fn written_file_is_human_readable_markdown() {
    let dir = tempdir().unwrap();
    let state = RalphState::new("goal", 10);
    write(dir.path(), &state).unwrap();

    let contents = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
    assert!(contents.starts_with("# Ralph Wiggum loop"));
    assert!(contents.contains("iteration: 1 / 10"));
}

#[test]
fn write_leaves_no_tmp_file() {
    let dir = tempdir().unwrap();
    let state = RalphState::new("goal", 10);
    write(dir.path(), &state).unwrap();
    assert!(!dir.path().join("ralph-loop.local.md.tmp").exists());
}
