// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment/path resolution for the daemon binary,
//! mirroring the teacher's `crates/daemon/src/env.rs`.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve `<cyrusHome>`: `CYRUS_HOME` env var, else `~/.cyrus`.
pub fn cyrus_home() -> PathBuf {
    if let Ok(dir) = std::env::var("CYRUS_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".cyrus")
}

pub fn config_path(cyrus_home: &std::path::Path) -> PathBuf {
    std::env::var("CYRUS_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| cyrus_home.join("config.json"))
}

pub fn backups_dir(cyrus_home: &std::path::Path) -> PathBuf {
    cyrus_home.join("backups")
}

pub fn logs_dir(cyrus_home: &std::path::Path) -> PathBuf {
    cyrus_home.join("logs")
}

/// HTTP bind address for webhook ingress + `/status` (spec §6).
pub fn bind_addr() -> String {
    std::env::var("CYRUS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3456".to_string())
}

/// Webhook ingress is "HTTP POST at a configurable path" (spec §6).
pub fn webhook_path() -> String {
    std::env::var("CYRUS_WEBHOOK_PATH").unwrap_or_else(|_| "/webhook".to_string())
}

/// Graceful-shutdown drain window (spec §5); default 5s.
pub fn drain_timeout() -> Duration {
    std::env::var("CYRUS_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
