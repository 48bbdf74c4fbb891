// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup (SPEC_FULL §10.1): a human-readable stdout
//! layer plus a rolling file sink under `<cyrusHome>/logs/`, filtered
//! by `RUST_LOG`/`CYRUS_LOG`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Returned guard must be held for the process lifetime — dropping it
/// stops the non-blocking file writer from flushing.
pub fn init(logs_dir: &std::path::Path) -> WorkerGuard {
    let _ = std::fs::create_dir_all(logs_dir);
    let file_appender = tracing_appender::rolling::daily(logs_dir, "cyrusd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = std::env::var("CYRUS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let stdout_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(false);

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
