// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic sync scheduler with failure backoff.
//!
//! The scheduler owns the registry and is its only writer. It runs a cycle,
//! then waits before the next one. When too many fetches of a cycle fail,
//! the wait doubles (up to a cap) until a fully successful cycle resets it.

use std::sync::Arc;
use std::time::Duration;

use plugsync_config::PlugsyncConfig;
use plugsync_core::{Clock, ManifestSource};
use plugsync_registry::{Registry, RegistryBackend};
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cycle::{CycleOptions, CycleOutcome, CycleReport, run_cycle};

/// States of the scheduler FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SchedulerState {
    /// Waiting for the next cycle at the nominal interval.
    Idle,
    /// A cycle is in flight.
    Running,
    /// Waiting for the next cycle at an increased interval.
    Backoff,
}

/// Wait computation between cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub interval: Duration,
    pub max_backoff: Duration,
    /// Failure fraction strictly above which a cycle triggers backoff.
    pub threshold: f64,
}

impl BackoffPolicy {
    pub fn from_config(config: &PlugsyncConfig) -> Self {
        Self {
            interval: config.sync.interval(),
            max_backoff: config.sync.max_backoff(),
            threshold: config.sync.backoff_threshold,
        }
    }

    /// Next state and wait after a cycle, given the wait used before it.
    pub fn next(&self, current_wait: Duration, report: &CycleReport) -> (SchedulerState, Duration) {
        if report.failure_fraction() > self.threshold {
            let doubled = current_wait.saturating_mul(2).min(self.max_backoff);
            (SchedulerState::Backoff, doubled.max(self.interval))
        } else if report.is_fully_successful() {
            (SchedulerState::Idle, self.interval)
        } else {
            (SchedulerState::Idle, current_wait)
        }
    }
}

/// Single-owner sync loop.
pub struct Scheduler {
    registry: Registry,
    source: Arc<dyn ManifestSource>,
    backend: Arc<dyn RegistryBackend>,
    clock: Arc<dyn Clock>,
    options: CycleOptions,
    policy: BackoffPolicy,
    state: SchedulerState,
    current_wait: Duration,
}

impl Scheduler {
    pub fn new(
        registry: Registry,
        source: Arc<dyn ManifestSource>,
        backend: Arc<dyn RegistryBackend>,
        clock: Arc<dyn Clock>,
        config: &PlugsyncConfig,
    ) -> Self {
        let policy = BackoffPolicy::from_config(config);
        Self {
            registry,
            source,
            backend,
            clock,
            options: CycleOptions::from_config(config),
            current_wait: policy.interval,
            policy,
            state: SchedulerState::Idle,
        }
    }

    /// Skip persistence in every cycle.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Wait before the next cycle.
    pub fn current_wait(&self) -> Duration {
        self.current_wait
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Runs a single cycle and applies the state transition.
    ///
    /// Returns `None` if the cycle was cancelled.
    pub async fn run_once(&mut self, cancel: &CancellationToken) -> Option<CycleReport> {
        self.state = SchedulerState::Running;
        let outcome = run_cycle(
            &mut self.registry,
            self.source.as_ref(),
            self.backend.as_ref(),
            self.clock.as_ref(),
            &self.options,
            cancel,
        )
        .await;

        match outcome {
            CycleOutcome::Completed(report) => {
                let (state, wait) = self.policy.next(self.current_wait, &report);
                if state == SchedulerState::Backoff {
                    warn!(
                        failed = report.failed,
                        total = report.total(),
                        wait_secs = wait.as_secs(),
                        "too many failed fetches, backing off"
                    );
                } else if wait > self.policy.interval {
                    debug!(wait_secs = wait.as_secs(), "keeping increased wait");
                }
                self.state = state;
                self.current_wait = wait;
                Some(report)
            }
            CycleOutcome::Cancelled => {
                self.state = SchedulerState::Idle;
                None
            }
        }
    }

    /// Runs cycles until `cancel` fires, returning the final registry.
    pub async fn run(mut self, cancel: CancellationToken) -> Registry {
        info!(
            interval_secs = self.policy.interval.as_secs(),
            max_backoff_secs = self.policy.max_backoff.as_secs(),
            "sync scheduler started"
        );

        while !cancel.is_cancelled() {
            if self.run_once(&cancel).await.is_none() {
                break;
            }

            let wait = self.current_wait;
            info!(state = %self.state, wait_secs = wait.as_secs(), "next sync cycle scheduled");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        info!("sync scheduler stopped");
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::{ErrorKind, SyncResult};

    fn policy() -> BackoffPolicy {
        BackoffPolicy {
            interval: Duration::from_secs(1800),
            max_backoff: Duration::from_secs(4 * 3600),
            threshold: 0.5,
        }
    }

    fn report(ok: usize, failed: usize) -> CycleReport {
        let mut results: Vec<SyncResult> =
            (0..ok).map(|i| SyncResult::unchanged(format!("ok{i}"))).collect();
        results.extend((0..failed).map(|i| SyncResult::failed(format!("f{i}"), ErrorKind::Timeout)));
        CycleReport {
            run_date: "2024/03/05".into(),
            updated: 0,
            unchanged: ok,
            failed,
            results,
            persisted: true,
            persist_error: None,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = policy();
        let mut wait = policy.interval;
        let mut seen = Vec::new();
        for _ in 0..5 {
            let (state, next) = policy.next(wait, &report(0, 4));
            assert_eq!(state, SchedulerState::Backoff);
            wait = next;
            seen.push(wait.as_secs());
        }
        assert_eq!(seen, vec![3600, 7200, 14400, 14400, 14400]);
    }

    #[test]
    fn exactly_threshold_does_not_back_off() {
        let (state, wait) = policy().next(Duration::from_secs(1800), &report(2, 2));
        assert_eq!(state, SchedulerState::Idle);
        assert_eq!(wait, Duration::from_secs(1800));
    }

    #[test]
    fn partial_failure_keeps_current_wait() {
        let (state, wait) = policy().next(Duration::from_secs(7200), &report(3, 1));
        assert_eq!(state, SchedulerState::Idle);
        assert_eq!(wait, Duration::from_secs(7200));
    }

    #[test]
    fn full_success_resets() {
        let (state, wait) = policy().next(Duration::from_secs(14400), &report(4, 0));
        assert_eq!(state, SchedulerState::Idle);
        assert_eq!(wait, Duration::from_secs(1800));
    }

    #[test]
    fn failed_persist_is_not_a_reset() {
        let mut r = report(4, 0);
        r.persisted = false;
        r.persist_error = Some(ErrorKind::PersistenceFailure);
        let (_, wait) = policy().next(Duration::from_secs(7200), &r);
        assert_eq!(wait, Duration::from_secs(7200));
    }

    #[test]
    fn state_display() {
        assert_eq!(SchedulerState::Backoff.to_string(), "backoff");
    }
}
