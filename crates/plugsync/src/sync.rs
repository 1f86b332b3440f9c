// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsync sync` command implementation.
//!
//! Runs exactly one sync cycle, prints the per-plugin results, and exits.
//! Failed fetches are reported but do not fail the command; a failed
//! persist does.

use plugsync_config::PlugsyncConfig;
use plugsync_core::SyncStatus;
use plugsync_sync::{CycleReport, install_signal_handler};

use crate::error::CliError;
use crate::serve::build_scheduler;

/// Runs the `plugsync sync` command.
pub async fn run_sync(config: &PlugsyncConfig, dry_run: bool, json: bool) -> Result<(), CliError> {
    let mut scheduler = build_scheduler(config)?.dry_run(dry_run);
    let cancel = install_signal_handler();

    let report = scheduler.run_once(&cancel).await;
    cancel.cancel();
    let report = report.ok_or(CliError::Cancelled)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dry_run);
    }

    match report.persist_error {
        Some(kind) => Err(CliError::NotPersisted { kind }),
        None => Ok(()),
    }
}

fn print_report(report: &CycleReport, dry_run: bool) {
    for result in &report.results {
        let status = match result.status {
            SyncStatus::Updated => "updated",
            SyncStatus::Unchanged => "unchanged",
            SyncStatus::Failed => "failed",
        };
        match result.error {
            Some(kind) => println!("{status:<10} {} ({kind})", result.id),
            None => println!("{status:<10} {}", result.id),
        }
    }

    let suffix = if dry_run { " (dry run, nothing written)" } else { "" };
    println!(
        "{} plugins: {} updated, {} unchanged, {} failed on {}{suffix}",
        report.total(),
        report.updated,
        report.unchanged,
        report.failed,
        report.run_date,
    );
}
