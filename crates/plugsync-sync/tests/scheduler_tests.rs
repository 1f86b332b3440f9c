// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduler loop tests on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use plugsync_config::PlugsyncConfig;
use plugsync_core::ErrorKind;
use plugsync_registry::RegistryBackend;
use plugsync_sync::{Scheduler, SchedulerState};
use plugsync_test_utils::{
    FixedClock, MemoryBackend, MockResponse, MockSource, legacy_entry, registry_of, repo_url,
};
use tokio_util::sync::CancellationToken;

fn config() -> PlugsyncConfig {
    let mut config = PlugsyncConfig::default();
    config.sync.interval_secs = 60;
    config.sync.max_backoff_secs = 240;
    config.fetch.timeout_secs = 5;
    config
}

fn scheduler(source: MockSource, backend: &MemoryBackend) -> Scheduler {
    Scheduler::new(
        backend.load().unwrap(),
        Arc::new(source),
        Arc::new(backend.clone()),
        Arc::new(FixedClock::ymd(2024, 3, 5)),
        &config(),
    )
}

#[tokio::test(start_paused = true)]
async fn run_once_transitions_state() {
    let backend = MemoryBackend::with_registry(registry_of([
        legacy_entry("a", "1.0"),
        legacy_entry("b", "1.0"),
        legacy_entry("c", "1.0"),
    ]));
    let source = MockSource::new()
        .respond(repo_url("a"), MockResponse::Fail(ErrorKind::NetworkUnavailable))
        .respond(repo_url("b"), MockResponse::Fail(ErrorKind::NetworkUnavailable))
        .respond(repo_url("c"), MockResponse::Version("1.0".into()));
    let mut scheduler = scheduler(source, &backend);
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    let report = scheduler.run_once(&CancellationToken::new()).await.unwrap();
    assert_eq!(report.failed, 2);
    assert_eq!(scheduler.state(), SchedulerState::Backoff);
    assert_eq!(scheduler.current_wait(), Duration::from_secs(120));

    scheduler.run_once(&CancellationToken::new()).await.unwrap();
    assert_eq!(scheduler.current_wait(), Duration::from_secs(240));
    assert_eq!(backend.persist_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn successful_cycle_resets_wait() {
    let backend = MemoryBackend::with_registry(registry_of([legacy_entry("a", "1.0")]));
    let source = MockSource::new().respond(repo_url("a"), MockResponse::Version("1.1".into()));
    let mut scheduler = scheduler(source, &backend);

    scheduler.run_once(&CancellationToken::new()).await.unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.current_wait(), Duration::from_secs(60));
    assert_eq!(scheduler.registry().get("a").unwrap().version, "1.1");
}

#[tokio::test(start_paused = true)]
async fn loop_backs_off_between_cycles() {
    let backend = MemoryBackend::with_registry(registry_of([legacy_entry("down", "1.0")]));
    let source = MockSource::new().respond(repo_url("down"), MockResponse::Fail(ErrorKind::Timeout));
    let calls = source.clone();
    let scheduler = scheduler(source, &backend);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    // Cycles start at t=0, 120, 360 and 600 (wait 120, then capped at 240).
    tokio::time::sleep(Duration::from_secs(601)).await;
    cancel.cancel();
    let registry = handle.await.unwrap();

    assert_eq!(calls.call_count().await, 4);
    assert_eq!(backend.persist_count(), 4);
    assert_eq!(registry.get("down").unwrap().version, "1.0");
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_waiting_loop() {
    let backend = MemoryBackend::with_registry(registry_of([legacy_entry("a", "1.0")]));
    let source = MockSource::new().respond(repo_url("a"), MockResponse::Version("1.0".into()));
    let scheduler = scheduler(source, &backend);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));
    tokio::time::sleep(Duration::from_secs(10)).await;
    cancel.cancel();

    let registry = handle.await.unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(backend.persist_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_runs_nothing() {
    let backend = MemoryBackend::with_registry(registry_of([legacy_entry("a", "1.0")]));
    let scheduler = scheduler(MockSource::new(), &backend);

    let cancel = CancellationToken::new();
    cancel.cancel();
    scheduler.run(cancel).await;

    assert_eq!(backend.persist_count(), 0);
}
