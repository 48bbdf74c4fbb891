// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn issue_state_type_maps_to_tracker_labels() {
    assert_eq!(IssueStateType::Active.to_string(), "In Progress");
    assert_eq!(IssueStateType::Completed.to_string(), "Done");
    assert_eq!(IssueStateType::Failed.to_string(), "Canceled");
    assert_eq!(IssueStateType::Paused.to_string(), "Paused");
}

#[test]
fn transient_classification_follows_status_code() {
    assert!(TrackerError::Timeout.is_transient());
    assert!(TrackerError::Http(503).is_transient());
    assert!(!TrackerError::Http(404).is_transient());
    assert!(!TrackerError::AuthenticationFailure.is_transient());
}
