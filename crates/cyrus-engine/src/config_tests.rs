// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn write_config(dir: &tempfile::TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, json).unwrap();
    path
}

fn minimal_repo_json(id: &str) -> String {
    format!(
        r#"{{
            "id": "{id}", "name": "{id}", "repositoryPath": "/tmp/{id}",
            "baseBranch": "main", "trackerToken": "tok", "trackerWorkspaceId": "ws-1",
            "teamKeys": ["{id}-TEAM"], "isActive": true
        }}"#
    )
}

#[test]
fn loads_and_validates_a_minimal_config() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("frontend"));
    let path = write_config(&dir, &json);

    let manager = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap();
    assert_eq!(manager.current().repositories.len(), 1);
    assert_eq!(manager.current().repositories[0].id, "frontend");
}

#[test]
fn rejects_duplicate_repository_ids() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(
        r#"{{"repositories": [{}, {}]}}"#,
        minimal_repo_json("frontend"),
        minimal_repo_json("frontend")
    );
    let path = write_config(&dir, &json);

    let err = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateRepositoryId(id) if id == "frontend"));
}

#[test]
fn rejects_two_catch_alls_in_the_same_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let catch_all = |id: &str| {
        format!(
            r#"{{"id": "{id}", "name": "{id}", "repositoryPath": "/tmp/{id}",
                 "baseBranch": "main", "trackerToken": "tok", "trackerWorkspaceId": "ws-1"}}"#
        )
    };
    let json = format!(r#"{{"repositories": [{}, {}]}}"#, catch_all("default-a"), catch_all("default-b"));
    let path = write_config(&dir, &json);

    let err = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap_err();
    assert!(matches!(err, ConfigError::AmbiguousCatchAll(ws) if ws == "ws-1"));
}

#[test]
fn rejects_routing_labels_with_no_include_or_exclude() {
    let dir = tempfile::tempdir().unwrap();
    let repo = r#"{
        "id": "frontend", "name": "frontend", "repositoryPath": "/tmp/frontend",
        "baseBranch": "main", "trackerToken": "tok", "trackerWorkspaceId": "ws-1",
        "routingLabels": {"priority": 10}
    }"#;
    let json = format!(r#"{{"repositories": [{repo}]}}"#);
    let path = write_config(&dir, &json);

    let err = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap_err();
    assert!(matches!(err, ConfigError::VacuousRoutingLabels(id) if id == "frontend"));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.json");
    let err = ConfigurationManager::load(&missing, dir.path().join("backups")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn scenario_f_reload_reports_an_added_repository() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("frontend"));
    let path = write_config(&dir, &json);
    let manager = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap();

    let json_with_new_repo =
        format!(r#"{{"repositories": [{}, {}]}}"#, minimal_repo_json("frontend"), minimal_repo_json("backend"));
    std::fs::write(&path, json_with_new_repo).unwrap();

    let diff = manager.reload_from_disk().unwrap();
    assert_eq!(diff.added, vec!["backend".to_string()]);
    assert!(diff.removed.is_empty());
    assert!(diff.modified.is_empty());
    assert_eq!(manager.current().repositories.len(), 2);
}

#[test]
fn reload_reports_removed_and_modified_repositories() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}, {}]}}"#, minimal_repo_json("frontend"), minimal_repo_json("backend"));
    let path = write_config(&dir, &json);
    let manager = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap();

    let modified_backend = r#"{
        "id": "backend", "name": "backend-renamed", "repositoryPath": "/tmp/backend",
        "baseBranch": "main", "trackerToken": "tok", "trackerWorkspaceId": "ws-1", "isActive": true
    }"#;
    let json_after = format!(r#"{{"repositories": [{}]}}"#, modified_backend);
    std::fs::write(&path, json_after).unwrap();

    let diff = manager.reload_from_disk().unwrap();
    assert_eq!(diff.removed, vec!["frontend".to_string()]);
    assert_eq!(diff.modified, vec!["backend".to_string()]);
    assert!(diff.added.is_empty());
}

#[test]
fn reload_with_no_semantic_change_is_an_empty_diff() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("frontend"));
    let path = write_config(&dir, &json);
    let manager = ConfigurationManager::load(&path, dir.path().join("backups")).unwrap();

    std::fs::write(&path, &json).unwrap();
    let diff = manager.reload_from_disk().unwrap();
    assert!(diff.is_empty());
}

#[test]
fn apply_writes_a_timestamped_backup_before_swapping() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("frontend"));
    let path = write_config(&dir, &json);
    let backups_dir = dir.path().join("backups");
    let manager = ConfigurationManager::load(&path, &backups_dir).unwrap();

    let mut new_doc = (*manager.current()).clone();
    new_doc.default_model = Some("opus".to_string());
    let diff = manager.apply(new_doc).unwrap();

    assert!(diff.other_changes);
    assert_eq!(manager.current().default_model.as_deref(), Some("opus"));
    let backups: Vec<_> = std::fs::read_dir(&backups_dir).unwrap().collect();
    assert_eq!(backups.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn scenario_f_watch_emits_a_diff_within_one_second_of_an_on_disk_edit() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("frontend"));
    let path = write_config(&dir, &json);
    let manager = Arc::new(ConfigurationManager::load(&path, dir.path().join("backups")).unwrap());

    let mut diffs = manager.clone().watch();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let json_with_new_repo =
        format!(r#"{{"repositories": [{}, {}]}}"#, minimal_repo_json("frontend"), minimal_repo_json("backend"));
    std::fs::write(&path, json_with_new_repo).unwrap();

    let diff = tokio::time::timeout(Duration::from_secs(2), diffs.recv()).await.expect("diff arrived").expect("channel open");
    assert_eq!(diff.added, vec!["backend".to_string()]);
}
