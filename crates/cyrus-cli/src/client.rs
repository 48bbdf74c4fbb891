// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the daemon's status surface (spec §6: `GET /status`).

use anyhow::{Context, Result};
use cyrus_core::ActiveWorkStatus;

/// Base URL of a running `cyrusd`, resolved once per invocation.
/// `CYRUS_DAEMON_URL` overrides the default, which targets the
/// daemon's default bind port on localhost (`cyrusd` itself binds
/// `0.0.0.0` by default so it is reachable from outside this host too).
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new() -> Self {
        let base_url = std::env::var("CYRUS_DAEMON_URL").unwrap_or_else(|_| "http://127.0.0.1:3456".to_string());
        Self { http: reqwest::Client::new(), base_url }
    }

    pub async fn status(&self) -> Result<ActiveWorkStatus> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach cyrusd at {}", self.base_url))?
            .error_for_status()
            .context("cyrusd returned an error response")?;
        response.json::<ActiveWorkStatus>().await.context("failed to parse cyrusd's status response")
    }
}

impl Default for DaemonClient {
    fn default() -> Self {
        Self::new()
    }
}
