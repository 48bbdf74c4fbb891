// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ConfigurationManager` (spec §4.8): loads, validates, hot-reloads,
//! and diffs the on-disk repository configuration.

use cyrus_core::RepositoryConfig;
use cyrus_storage::PersistenceStore;
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

const DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Persist(#[from] cyrus_storage::PersistenceError),
    #[error("duplicate repository id {0:?}")]
    DuplicateRepositoryId(String),
    #[error("multiple workspace catch-alls configured for tracker workspace {0:?}")]
    AmbiguousCatchAll(String),
    #[error("repository {0:?} sets routingLabels with no include or exclude labels")]
    VacuousRoutingLabels(String),
}

/// The on-disk config document (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub repositories: Vec<RepositoryConfig>,
    #[serde(default)]
    pub disallowed_tools: Vec<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub default_fallback_model: Option<String>,
    #[serde(default, rename = "global_setup_script")]
    pub global_setup_script: Option<String>,
    #[serde(default)]
    pub ngrok_auth_token: Option<String>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
}

impl ConfigDocument {
    /// Unique repository `id`s; at most one catch-all per
    /// `trackerWorkspaceId`; a `routingLabels` block must name at least
    /// one include or exclude label. Rejected eagerly at load time
    /// (DESIGN.md Open Question 1), not deferred to first routing
    /// decision. `priority` itself has no presence check: `RoutingLabels`
    /// models it as a plain `i32` defaulting to 0, so an omitted
    /// priority and an explicit `0` are indistinguishable and both are
    /// valid — 0 just loses every tie against a repo that set one.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_ids = std::collections::HashSet::new();
        for repo in &self.repositories {
            if !seen_ids.insert(repo.id.as_str()) {
                return Err(ConfigError::DuplicateRepositoryId(repo.id.clone()));
            }
            if let Some(routing) = &repo.routing_labels {
                if routing.include.is_empty() && routing.exclude.is_empty() {
                    return Err(ConfigError::VacuousRoutingLabels(repo.id.clone()));
                }
            }
        }
        let mut catch_all_workspaces = std::collections::HashMap::<&str, usize>::new();
        for repo in self.repositories.iter().filter(|r| r.is_catch_all()) {
            *catch_all_workspaces.entry(repo.tracker_workspace_id.as_str()).or_insert(0) += 1;
        }
        if let Some((workspace, _)) = catch_all_workspaces.iter().find(|(_, count)| **count > 1) {
            return Err(ConfigError::AmbiguousCatchAll((*workspace).to_string()));
        }
        Ok(())
    }
}

/// `{added, removed, modified, otherChanges}` produced by comparing two
/// config generations (spec §4.8).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub other_changes: bool,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty() && !self.other_changes
    }

    fn compute(old: &ConfigDocument, new: &ConfigDocument) -> Self {
        let old_by_id: std::collections::HashMap<&str, &RepositoryConfig> =
            old.repositories.iter().map(|r| (r.id.as_str(), r)).collect();
        let new_by_id: std::collections::HashMap<&str, &RepositoryConfig> =
            new.repositories.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut added: Vec<String> = new_by_id.keys().filter(|id| !old_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
        let mut removed: Vec<String> = old_by_id.keys().filter(|id| !new_by_id.contains_key(*id)).map(|s| s.to_string()).collect();
        let mut modified: Vec<String> = new_by_id
            .iter()
            .filter_map(|(id, new_repo)| old_by_id.get(id).filter(|old_repo| old_repo != new_repo).map(|_| id.to_string()))
            .collect();
        added.sort();
        removed.sort();
        modified.sort();

        let other_changes = old.disallowed_tools != new.disallowed_tools
            || old.default_model != new.default_model
            || old.default_fallback_model != new.default_fallback_model
            || old.global_setup_script != new.global_setup_script
            || old.ngrok_auth_token != new.ngrok_auth_token
            || old.stripe_customer_id != new.stripe_customer_id;

        Self { added, removed, modified, other_changes }
    }
}

/// Watches `<cyrusHome>/config.json`, validates reloads, and publishes
/// `{added, removed, modified, otherChanges}` diffs. Repository
/// credentials and routing are hot-swappable; a session already
/// running keeps the `RepositoryConfig` it started with until terminal
/// (the coordinator resolves repositories by id on each use, never
/// holding a stale clone across a reload).
pub struct ConfigurationManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
    current: RwLock<Arc<ConfigDocument>>,
    /// Set for the brief window after a programmatic `apply()` writes
    /// the file, so the filesystem watcher doesn't re-enter on its own
    /// write (spec §4.8).
    suppress_watch: Arc<AtomicBool>,
}

impl ConfigurationManager {
    /// Load and validate `config_path`, failing if it doesn't parse or
    /// violates an invariant.
    pub fn load(config_path: impl Into<PathBuf>, backups_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = config_path.into();
        let doc = Self::read(&config_path)?;
        doc.validate()?;
        Ok(Self {
            config_path,
            backups_dir: backups_dir.into(),
            current: RwLock::new(Arc::new(doc)),
            suppress_watch: Arc::new(AtomicBool::new(false)),
        })
    }

    fn read(path: &Path) -> Result<ConfigDocument, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn current(&self) -> Arc<ConfigDocument> {
        self.current.read().clone()
    }

    /// Re-read the config file from disk, validate, and swap if valid.
    /// Returns the diff against the previous generation (possibly
    /// empty, if the file changed but nothing semantically did).
    pub fn reload_from_disk(&self) -> Result<ConfigDiff, ConfigError> {
        let doc = Self::read(&self.config_path)?;
        doc.validate()?;
        let diff = {
            let mut current = self.current.write();
            let diff = ConfigDiff::compute(&current, &doc);
            *current = Arc::new(doc);
            diff
        };
        Ok(diff)
    }

    /// Programmatic update: validate, back up the current file,
    /// atomically rewrite it, suppress the watcher briefly, then swap
    /// in-memory. Returns the diff against the previous generation.
    pub fn apply(&self, new_doc: ConfigDocument) -> Result<ConfigDiff, ConfigError> {
        new_doc.validate()?;
        self.write_backup()?;
        self.suppress_watch.store(true, Ordering::SeqCst);
        let store = PersistenceStore::new(&self.config_path);
        store.save(&new_doc)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = std::fs::metadata(&self.config_path) {
                let mut perms = meta.permissions();
                perms.set_mode(0o644);
                let _ = std::fs::set_permissions(&self.config_path, perms);
            }
        }
        let diff = {
            let mut current = self.current.write();
            let diff = ConfigDiff::compute(&current, &new_doc);
            *current = Arc::new(new_doc);
            diff
        };
        let suppress = self.suppress_watch.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;
            suppress.store(false, Ordering::SeqCst);
        });
        Ok(diff)
    }

    fn write_backup(&self) -> Result<(), ConfigError> {
        let Ok(bytes) = std::fs::read(&self.config_path) else { return Ok(()) };
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let backup_path = self.backups_dir.join(format!("config-{timestamp}.json"));
        if let Some(parent) = backup_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(&backup_path, bytes).map_err(|source| ConfigError::Io { path: backup_path, source })
    }

    /// Spawn the debounced file watcher, emitting a `config:reloaded`
    /// diff on the returned channel for every accepted change. The
    /// watcher itself runs on a blocking notify callback; a 500 ms
    /// debounce timer coalesces bursts of filesystem events into one
    /// reload, matching spec §4.8.
    pub fn watch(self: Arc<Self>) -> mpsc::Receiver<ConfigDiff> {
        let (diff_tx, diff_rx) = mpsc::channel(8);
        let (raw_tx, mut raw_rx) = mpsc::channel(64);

        let watch_path = self.config_path.clone();
        std::thread::spawn(move || {
            let tx = raw_tx;
            let watcher_result: notify::Result<RecommendedWatcher> =
                notify::recommended_watcher(move |res: notify::Result<NotifyEvent>| {
                    if let Ok(event) = res {
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            let _ = tx.blocking_send(());
                        }
                    }
                });
            let Ok(mut watcher) = watcher_result else { return };
            let Some(dir) = watch_path.parent() else { return };
            if watcher.watch(dir, RecursiveMode::NonRecursive).is_err() {
                return;
            }
            // Keep the watcher alive for the life of the thread.
            std::thread::park();
        });

        tokio::spawn(async move {
            loop {
                if raw_rx.recv().await.is_none() {
                    break;
                }
                tokio::time::sleep(DEBOUNCE).await;
                while raw_rx.try_recv().is_ok() {}
                if self.suppress_watch.load(Ordering::SeqCst) {
                    continue;
                }
                match self.reload_from_disk() {
                    Ok(diff) if !diff.is_empty() => {
                        info!(added = diff.added.len(), removed = diff.removed.len(), modified = diff.modified.len(), "config reloaded");
                        if diff_tx.send(diff).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "config reload rejected"),
                }
            }
        });

        diff_rx
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
