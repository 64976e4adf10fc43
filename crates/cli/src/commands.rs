// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers over the file-backed store.

use crate::output;
use anyhow::{Context as _, Result};
use muster_core::{Clock, LifecycleState, SystemClock, WorkerId};
use muster_fleet::{
    env, ChangeOptions, FleetConfig, FleetCoordinator, FsStorage, HeartbeatStore, StopOptions,
    WorkerLookup,
};
use std::path::PathBuf;
use std::time::Duration;

pub struct Context {
    coordinator: FleetCoordinator<FsStorage, SystemClock>,
    lookup: WorkerLookup<FsStorage, SystemClock>,
    clock: SystemClock,
}

impl Context {
    /// Open the shared store at the given directory, or the
    /// environment default.
    pub fn open(state_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match state_dir {
            Some(dir) => dir,
            None => env::state_dir()?,
        };
        let storage = FsStorage::open(&dir)
            .with_context(|| format!("opening state dir {}", dir.display()))?;
        let store = HeartbeatStore::new(storage, SystemClock);
        Ok(Self {
            coordinator: FleetCoordinator::new(store.clone(), FleetConfig::from_env()),
            lookup: WorkerLookup::new(store),
            clock: SystemClock,
        })
    }
}

pub async fn status(ctx: &Context) -> Result<()> {
    let proxies = ctx.coordinator.workers().await?;
    print!("{}", output::render_status(&proxies, ctx.clock.epoch_ms()));
    Ok(())
}

pub async fn pause(ctx: &Context, timeout: Option<Duration>) -> Result<()> {
    ctx.coordinator.pause_all(ChangeOptions { timeout }).await?;
    println!("Fleet paused");
    Ok(())
}

pub async fn resume(ctx: &Context, timeout: Option<Duration>) -> Result<()> {
    ctx.coordinator.unpause_all(ChangeOptions { timeout }).await?;
    println!("Fleet running");
    Ok(())
}

pub async fn stop(ctx: &Context, timeout: Option<Duration>, no_reset: bool) -> Result<()> {
    ctx.coordinator.stop_all(StopOptions { timeout, reset_to_running: !no_reset }).await?;
    if no_reset {
        println!("Fleet stopped (desired state left at 'stopped')");
    } else {
        println!("Fleet stopped");
    }
    Ok(())
}

pub async fn refresh(ctx: &Context, timeout: Option<Duration>) -> Result<()> {
    ctx.coordinator.refresh_worker_info(ChangeOptions { timeout }).await?;
    println!("All workers reported fresh heartbeats");
    Ok(())
}

pub async fn forget(ctx: &Context, id: &str) -> Result<()> {
    let id = WorkerId::from_string(id);
    let remaining = ctx.coordinator.forget_worker(&id).await?;
    println!("Forgot {} ({} workers remain)", id, remaining.len());
    Ok(())
}

pub async fn purge(ctx: &Context) -> Result<()> {
    let remaining = ctx.coordinator.purge_stale_worker_info().await?;
    println!("Purged stale records ({} workers remain)", remaining.len());
    Ok(())
}

pub async fn info(ctx: &Context, id: &str, field: Option<&str>) -> Result<()> {
    let id = WorkerId::from_string(id);
    match field {
        Some(field) => {
            let value = ctx.lookup.attr(&id, field).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        None => {
            let proxy = ctx.lookup.proxy(&id).await?;
            println!("{}", serde_json::to_string_pretty(proxy.record())?);
            if proxy.record().state == Some(LifecycleState::Stopped) {
                println!("(worker has stopped; record is eligible for purge)");
            }
        }
    }
    Ok(())
}
