// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsync validate` command implementation.
//!
//! Reports every problem across both stores instead of stopping at the
//! first, so a pull request can be fixed in one pass.

use plugsync_config::PlugsyncConfig;
use tracing::info;

use crate::error::CliError;
use crate::serve::file_store;

/// Runs the `plugsync validate` command.
pub fn run_validate(config: &PlugsyncConfig) -> Result<(), CliError> {
    let store = file_store(config);
    let issues = store.validate();

    if issues.is_empty() {
        info!(
            legacy = %store.legacy_path().display(),
            cw2 = %store.cw2_dir().display(),
            "plugin stores are valid"
        );
        println!("ok: no problems found");
        return Ok(());
    }

    for issue in &issues {
        println!("{issue}");
    }
    Err(CliError::Invalid {
        count: issues.len(),
    })
}
