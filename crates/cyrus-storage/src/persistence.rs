// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic, crash-safe document persistence (spec §4.2).
//!
//! Every write goes through `<path>.tmp` → `fsync` → `rename`, so a
//! reader always observes either the last-committed document or the
//! next one, never a partial write.

use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing document for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes one JSON document at `path` with the tmp+fsync+rename
/// discipline. One store per logical document (state file,
/// `active-work.json`, ...); callers are responsible for serializing
/// concurrent writers onto a single task as spec §5 requires.
pub struct PersistenceStore {
    path: PathBuf,
}

impl PersistenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `doc` and atomically replace the target file.
    pub fn save<T: Serialize>(&self, doc: &T) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_vec_pretty(doc)
            .map_err(|source| PersistenceError::Serialize { path: self.path.clone(), source })?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)
            .map_err(|source| PersistenceError::Io { path: tmp_path.clone(), source })?;
        file.write_all(&json).map_err(|source| PersistenceError::Io { path: tmp_path.clone(), source })?;
        file.sync_all().map_err(|source| PersistenceError::Io { path: tmp_path.clone(), source })?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|source| PersistenceError::Io { path: self.path.clone(), source })?;
        Ok(())
    }

    /// Load and deserialize the document, or `None` for a missing file,
    /// corrupted JSON, or (when `validate_version` rejects it) a
    /// version mismatch — all three are logged and treated the same
    /// way per spec §4.2.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed reading persisted document");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupted persisted document");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
