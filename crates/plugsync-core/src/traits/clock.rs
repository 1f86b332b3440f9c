// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock abstraction used to stamp update dates.

use chrono::{DateTime, Utc};

use crate::types::UPDATE_DATE_FORMAT;

/// Source of the current time for a sync cycle.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// The run date of a cycle started now, in `update_date` format.
    fn run_date(&self) -> String {
        self.now().format(UPDATE_DATE_FORMAT).to_string()
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
