// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync cycle and scheduler for Plugsync.
//!
//! Fetches every registered plugin's manifest with bounded concurrency,
//! merges new versions into the registry, persists once per cycle, and
//! repeats on an interval that backs off while fetches keep failing.

pub mod cycle;
pub mod merge;
pub mod scheduler;
pub mod shutdown;

pub use cycle::{CycleOptions, CycleOutcome, CycleReport, run_cycle};
pub use merge::{apply_fetch, merge_entry};
pub use scheduler::{BackoffPolicy, Scheduler, SchedulerState};
pub use shutdown::install_signal_handler;
