// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::persistence::PersistenceStore;
use tempfile::tempdir;

#[test]
fn new_document_stamps_current_version() {
    let doc = PersistedState::new(1_000, StateBody::default());
    assert!(doc.is_current_version());
}

#[test]
fn load_from_round_trips_through_store() {
    let dir = tempdir().unwrap();
    let store = PersistenceStore::new(dir.path().join("edge-worker-state.json"));
    let doc = PersistedState::new(1_000, StateBody::default());
    store.save(&doc).unwrap();

    let loaded = PersistedState::load_from(&store).unwrap();
    assert_eq!(loaded.saved_at, 1_000);
    assert_eq!(loaded.version, CURRENT_STATE_VERSION);
}

#[test]
fn load_from_rejects_mismatched_version() {
    let dir = tempdir().unwrap();
    let store = PersistenceStore::new(dir.path().join("edge-worker-state.json"));
    let mut doc = PersistedState::new(1_000, StateBody::default());
    doc.version = CURRENT_STATE_VERSION + 1;
    store.save(&doc).unwrap();

    assert!(PersistedState::load_from(&store).is_none());
}

#[test]
fn load_from_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let store = PersistenceStore::new(dir.path().join("missing.json"));
    assert!(PersistedState::load_from(&store).is_none());
}
