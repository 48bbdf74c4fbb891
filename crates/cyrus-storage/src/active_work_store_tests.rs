// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cyrus_core::ActiveSessionSummary;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_empty_status() {
    let dir = tempdir().unwrap();
    let store = ActiveWorkStore::new(dir.path());
    let status = store.load(42);
    assert!(!status.is_working);
    assert_eq!(status.last_updated, 42);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store = ActiveWorkStore::new(dir.path());
    let summary = ActiveSessionSummary {
        issue_id: "i1".into(),
        issue_identifier: "ENG-1".into(),
        repository_id: "r1".into(),
        started_at: 10,
    };
    let status = cyrus_core::ActiveWorkStatus::from_sessions([("sess-1".to_string(), summary)], 20);
    store.save(&status).unwrap();

    let loaded = store.load(0);
    assert!(loaded.is_working);
    assert_eq!(loaded.active_sessions.len(), 1);
}

#[test]
fn clear_resets_to_empty() {
    let dir = tempdir().unwrap();
    let store = ActiveWorkStore::new(dir.path());
    let summary = ActiveSessionSummary {
        issue_id: "i1".into(),
        issue_identifier: "ENG-1".into(),
        repository_id: "r1".into(),
        started_at: 10,
    };
    let status = cyrus_core::ActiveWorkStatus::from_sessions([("sess-1".to_string(), summary)], 20);
    store.save(&status).unwrap();
    store.clear(99).unwrap();

    let loaded = store.load(0);
    assert!(!loaded.is_working);
    assert_eq!(loaded.last_updated, 99);
}

#[test]
fn load_corrupted_file_returns_nothing_active() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    std::fs::write(dir.path().join("state").join("active-work.json"), b"garbage").unwrap();
    let store = ActiveWorkStore::new(dir.path());
    let loaded = store.load(5);
    assert!(!loaded.is_working);
}
