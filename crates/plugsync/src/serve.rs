// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsync serve` command implementation.
//!
//! Loads the registry, then runs sync cycles on the configured interval
//! until SIGINT or SIGTERM. An interrupted cycle is discarded.

use std::sync::Arc;

use plugsync_config::PlugsyncConfig;
use plugsync_core::SystemClock;
use plugsync_fetch::HttpManifestFetcher;
use plugsync_registry::{FileStore, RegistryBackend};
use plugsync_sync::{Scheduler, install_signal_handler};
use tracing::info;

use crate::error::CliError;

/// The file store described by the `[registry]` section.
pub(crate) fn file_store(config: &PlugsyncConfig) -> FileStore {
    FileStore::new(&config.registry.legacy_path, &config.registry.cw2_dir)
        .allow_non_github(config.registry.allow_non_github)
}

/// Loads the registry and wires a scheduler with the HTTP fetcher.
pub(crate) fn build_scheduler(config: &PlugsyncConfig) -> Result<Scheduler, CliError> {
    let store = file_store(config);
    let registry = store.load()?;
    let fetcher = HttpManifestFetcher::new(&config.fetch)?;

    Ok(Scheduler::new(
        registry,
        Arc::new(fetcher),
        Arc::new(store),
        Arc::new(SystemClock),
        config,
    ))
}

/// Runs the `plugsync serve` command.
pub async fn run_serve(config: &PlugsyncConfig) -> Result<(), CliError> {
    info!("starting plugsync serve");

    let scheduler = build_scheduler(config)?;
    info!(plugins = scheduler.registry().len(), "registry ready");

    let cancel = install_signal_handler();
    let registry = scheduler.run(cancel).await;

    info!(plugins = registry.len(), "plugsync serve stopped");
    Ok(())
}
