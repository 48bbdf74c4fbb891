// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `active-work.json` read/write (spec §4.2, §6).
//!
//! Corruption here is treated as "nothing active" rather than a fatal
//! error — an orchestrator can always rebuild this view from its live
//! session registry on the next write.

use crate::persistence::{PersistenceError, PersistenceStore};
use cyrus_core::ActiveWorkStatus;
use std::path::Path;

pub struct ActiveWorkStore {
    inner: PersistenceStore,
}

impl ActiveWorkStore {
    pub fn new(cyrus_home: &Path) -> Self {
        Self { inner: PersistenceStore::new(cyrus_home.join("state").join("active-work.json")) }
    }

    pub fn save(&self, status: &ActiveWorkStatus) -> Result<(), PersistenceError> {
        self.inner.save(status)
    }

    /// Returns an empty, "nothing active" status for a missing or
    /// corrupted file.
    pub fn load(&self, fallback_epoch_ms: u64) -> ActiveWorkStatus {
        self.inner.load().unwrap_or_else(|| ActiveWorkStatus::empty(fallback_epoch_ms))
    }

    pub fn clear(&self, now_epoch_ms: u64) -> Result<(), PersistenceError> {
        self.save(&ActiveWorkStatus::empty(now_epoch_ms))
    }
}

#[cfg(test)]
#[path = "active_work_store_tests.rs"]
mod tests;
