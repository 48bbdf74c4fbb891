// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cyrus`: a thin CLI over the daemon's status surface (SPEC_FULL §11).

mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cyrus", version = env!("BUILD_GIT_HASH"), about = "Cyrus agent-orchestration daemon client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the daemon's current active-work status.
    Status {
        /// Re-render the status every `CYRUS_STATUS_POLL_MS` (default 2000ms) until interrupted.
        #[arg(long)]
        watch: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status { watch, format } => commands::status::handle(format, watch).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}
