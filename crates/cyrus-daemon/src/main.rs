// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cyrusd`: the daemon binary. Wires the orchestration core (spec §4)
//! to a concrete HTTP webhook ingress + `/status` endpoint (spec §6).
//!
//! The concrete tracker transport (Linear) and concrete agent runner
//! processes (Claude/Codex/OpenCode/Gemini) are out of scope for this
//! workspace (spec §1); this binary ships [`reference_tracker::ReferenceIssueTracker`]
//! and [`cyrus_adapters::ProcessRunner`] so it is runnable end-to-end
//! without fabricating either.

mod auth_config;
mod error;
mod logging;
mod paths;
mod reference_tracker;
mod runner_wiring;
mod webhook;

use axum::routing::{get, post};
use axum::Router;
use cyrus_adapters::IssueTracker;
use cyrus_core::SystemClock;
use cyrus_engine::{ConfigurationManager, Orchestrator};
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth_config::WebhookAuthConfig;
use crate::error::DaemonError;
use crate::webhook::AppState;

fn build_trackers(config: &cyrus_engine::ConfigDocument) -> HashMap<String, Arc<dyn IssueTracker>> {
    config
        .repositories
        .iter()
        .map(|repo| (repo.id.clone(), Arc::new(reference_tracker::ReferenceIssueTracker::new(repo.id.clone())) as Arc<dyn IssueTracker>))
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cyrus_home = paths::cyrus_home();
    let _logging_guard = logging::init(&paths::logs_dir(&cyrus_home));

    match run(cyrus_home).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "cyrusd exited with a fatal startup error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cyrus_home: std::path::PathBuf) -> Result<(), DaemonError> {
    std::fs::create_dir_all(&cyrus_home)?;
    let config_path = paths::config_path(&cyrus_home);
    let backups_dir = paths::backups_dir(&cyrus_home);
    let config = Arc::new(ConfigurationManager::load(&config_path, backups_dir)?);
    info!(repositories = config.current().repositories.len(), "configuration loaded");

    // `Orchestrator::trackers` is a fixed map built once here; adding a
    // brand-new repository to the on-disk config still requires a
    // daemon restart to pick up a tracker binding for it (config
    // hot-reload only affects routing, not this map).
    let trackers = build_trackers(&config.current());
    let runner_factory = runner_wiring::build_runner_factory(cyrus_home.join("workspaces"));
    let orchestrator = Arc::new(Orchestrator::new(cyrus_home.clone(), trackers, runner_factory, SystemClock));

    let recovered = orchestrator.recover().await;
    info!(recovered, "crash recovery complete");

    let config_for_watch = config.clone();
    tokio::spawn(async move {
        let mut diffs = config_for_watch.watch();
        while let Some(diff) = diffs.recv().await {
            info!(added = diff.added.len(), removed = diff.removed.len(), modified = diff.modified.len(), "config reloaded");
        }
    });

    let state = AppState { orchestrator: orchestrator.clone(), config, auth: WebhookAuthConfig::from_env() };
    let app: Router = Router::new()
        .route(&paths::webhook_path(), post(webhook::handle::<SystemClock>))
        .route("/status", get(webhook::status::<SystemClock>))
        .with_state(state);

    let bind_addr = paths::bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, webhook_path = %paths::webhook_path(), "cyrusd listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(orchestrator)).await?;
    Ok(())
}

/// Waits for Ctrl+C, then drives the orchestrator's graceful shutdown
/// (spec §5: stop accepting webhooks, signal every active coordinator,
/// wait bounded time, force-persist).
async fn shutdown_signal(orchestrator: Arc<Orchestrator<SystemClock>>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received, draining active sessions");
    orchestrator.shutdown(paths::drain_timeout()).await;
}
