// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cyrus status` / `cyrus status --watch` (SPEC_FULL §11): a thin
//! client over the daemon's `GET /status` (spec §6).

use anyhow::Result;
use cyrus_core::ActiveWorkStatus;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

fn print_text(status: &ActiveWorkStatus) {
    if !status.is_working {
        println!("No active work");
        return;
    }
    println!("{} active session(s):", status.active_sessions.len());
    let mut sessions: Vec<_> = status.active_sessions.values().collect();
    sessions.sort_by(|a, b| a.started_at.cmp(&b.started_at));
    for session in sessions {
        println!("  [{}] {} ({})", session.repository_id, session.issue_identifier, session.issue_id);
    }
}

pub async fn handle(format: OutputFormat, watch: bool) -> Result<()> {
    let client = DaemonClient::new();

    if !watch {
        let status = client.status().await?;
        return format_or_json(format, &status, || print_text(&status));
    }

    let poll_ms: u64 = std::env::var("CYRUS_STATUS_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(2000);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        match client.status().await {
            Ok(status) => {
                if matches!(format, OutputFormat::Text) {
                    print!("\x1B[2J\x1B[1;1H");
                }
                format_or_json(format, &status, || print_text(&status))?;
            }
            Err(e) => eprintln!("failed to reach cyrusd: {e:#}"),
        }
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_millis(poll_ms)) => {}
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}
