// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `muster` — operator CLI for the fleet coordination layer.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "muster", about = "Worker fleet coordination and liveness", version)]
struct Cli {
    /// State directory shared with the workers (default: MUSTER_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all known workers and their last published heartbeat
    Status,
    /// Pause the whole fleet and wait for convergence
    Pause {
        /// Convergence timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Resume (unpause) the whole fleet
    Resume {
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Stop the whole fleet
    Stop {
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Leave the desired state at 'stopped' instead of resetting
        /// it to 'running' afterwards
        #[arg(long)]
        no_reset: bool,
    },
    /// Ask every worker for a fresh heartbeat and wait for it
    Refresh {
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Remove one worker's heartbeat record
    Forget {
        /// Worker id (wkr-...)
        id: String,
    },
    /// Garbage-collect records of stopped or state-less workers
    Purge,
    /// Show a worker's record, or a single field of it
    Info {
        /// Worker id (wkr-...)
        id: String,
        /// Field name (e.g. state, hostname, processed_last_hour)
        field: Option<String>,
    },
}

fn timeout_opt(timeout_ms: Option<u64>) -> Option<Duration> {
    timeout_ms.map(Duration::from_millis)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::open(cli.state_dir)?;

    match cli.command {
        Command::Status => commands::status(&ctx).await,
        Command::Pause { timeout_ms } => commands::pause(&ctx, timeout_opt(timeout_ms)).await,
        Command::Resume { timeout_ms } => commands::resume(&ctx, timeout_opt(timeout_ms)).await,
        Command::Stop { timeout_ms, no_reset } => {
            commands::stop(&ctx, timeout_opt(timeout_ms), no_reset).await
        }
        Command::Refresh { timeout_ms } => commands::refresh(&ctx, timeout_opt(timeout_ms)).await,
        Command::Forget { id } => commands::forget(&ctx, &id).await,
        Command::Purge => commands::purge(&ctx).await,
        Command::Info { id, field } => commands::info(&ctx, &id, field.as_deref()).await,
    }
}
