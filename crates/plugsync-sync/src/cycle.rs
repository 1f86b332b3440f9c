// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One sync cycle: fetch every manifest, merge, persist once.
//!
//! Fetches fan out with bounded concurrency and report back to the single
//! task that owns the registry. Merging happens on a working copy which only
//! replaces the caller's registry once the cycle settled and was persisted,
//! so a cancelled cycle or a failed persist leaves everything as it was.

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use plugsync_config::PlugsyncConfig;
use plugsync_core::{Clock, ErrorKind, ManifestSource, SyncError, SyncResult, SyncStatus};
use plugsync_registry::{Registry, RegistryBackend};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::merge::apply_fetch;

/// Knobs for a single cycle.
#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub max_concurrent_fetches: usize,
    pub fetch_timeout: Duration,
    /// Informative only: a slower cycle is logged, never aborted.
    pub warn_after: Duration,
    /// Merge and report without writing the stores.
    pub dry_run: bool,
}

impl CycleOptions {
    pub fn from_config(config: &PlugsyncConfig) -> Self {
        Self {
            max_concurrent_fetches: config.sync.max_concurrent_fetches.max(1),
            fetch_timeout: config.fetch.timeout(),
            warn_after: config.sync.cycle_warn(),
            dry_run: false,
        }
    }
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self::from_config(&PlugsyncConfig::default())
    }
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub run_date: String,
    pub results: Vec<SyncResult>,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<ErrorKind>,
    pub elapsed_ms: u64,
}

impl CycleReport {
    fn new(run_date: String, results: Vec<SyncResult>) -> Self {
        let count = |status: SyncStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            updated: count(SyncStatus::Updated),
            unchanged: count(SyncStatus::Unchanged),
            failed: count(SyncStatus::Failed),
            run_date,
            results,
            persisted: false,
            persist_error: None,
            elapsed_ms: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Share of plugins whose fetch failed; zero for an empty registry.
    pub fn failure_fraction(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.failed as f64 / self.results.len() as f64
        }
    }

    /// No failed plugin and no failed persist.
    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0 && self.persist_error.is_none()
    }
}

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Cancelled before settling; nothing was merged or persisted.
    Cancelled,
}

/// Runs one cycle against `registry`.
///
/// Every entry is fetched, each result is merged, then `backend.persist` is
/// called exactly once (unless `dry_run`), also when some fetches failed.
/// On a persistence failure `registry` keeps its previous contents and the
/// error is recorded in the report.
pub async fn run_cycle(
    registry: &mut Registry,
    source: &dyn ManifestSource,
    backend: &dyn RegistryBackend,
    clock: &dyn Clock,
    options: &CycleOptions,
    cancel: &CancellationToken,
) -> CycleOutcome {
    let started = Instant::now();
    let run_date = clock.run_date();
    let targets: Vec<_> = registry
        .list()
        .into_iter()
        .map(|entry| (entry.id.clone(), entry.location()))
        .collect();
    info!(plugins = targets.len(), run_date = %run_date, "sync cycle started");

    let fetch_timeout = options.fetch_timeout;
    let fetch_futures: Vec<_> = targets
        .iter()
        .map(|(id, location)| async move {
            let result = match tokio::time::timeout(fetch_timeout, source.fetch(location)).await {
                Ok(result) => result,
                Err(_) => Err(SyncError::Timeout {
                    duration: fetch_timeout,
                }),
            };
            (id.clone(), result)
        })
        .collect();
    let fetches = futures::stream::iter(fetch_futures)
    .buffer_unordered(options.max_concurrent_fetches.max(1))
    .collect::<Vec<_>>();

    let fetched = tokio::select! {
        _ = cancel.cancelled() => {
            warn!("sync cycle cancelled, discarding in-flight fetches");
            return CycleOutcome::Cancelled;
        }
        fetched = fetches => fetched,
    };

    let mut by_id: HashMap<String, _> = fetched.into_iter().collect();
    let mut working = registry.clone();
    let results: Vec<SyncResult> = targets
        .iter()
        .map(|(id, _)| {
            let outcome = by_id.remove(id).unwrap_or_else(|| {
                Err(SyncError::PluginNotFound { id: id.clone() })
            });
            apply_fetch(&mut working, id, outcome, &run_date)
        })
        .collect();

    let mut report = CycleReport::new(run_date, results);

    if cancel.is_cancelled() {
        warn!("sync cycle cancelled before persist, discarding merge");
        return CycleOutcome::Cancelled;
    }

    if options.dry_run {
        info!("dry run, skipping persist");
        *registry = working;
    } else {
        match backend.persist(&working) {
            Ok(()) => {
                report.persisted = true;
                *registry = working;
            }
            Err(err) => {
                error!(error = %err, "failed to persist registry, keeping previous state");
                report.persist_error = Some(err.kind());
            }
        }
    }

    let elapsed = started.elapsed();
    report.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    if elapsed > options.warn_after {
        warn!(
            elapsed_secs = elapsed.as_secs(),
            limit_secs = options.warn_after.as_secs(),
            "sync cycle ran longer than expected"
        );
    }

    info!(
        total = report.total(),
        updated = report.updated,
        unchanged = report.unchanged,
        failed = report.failed,
        persisted = report.persisted,
        "sync cycle finished"
    );
    CycleOutcome::Completed(report)
}
