// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsync index` command implementation.

use std::path::{Path, PathBuf};

use plugsync_config::PlugsyncConfig;
use plugsync_registry::{default_index_path, generate_index, write_index};

use crate::error::CliError;

/// Runs the `plugsync index` command.
pub fn run_index(config: &PlugsyncConfig, output: Option<&Path>) -> Result<(), CliError> {
    let cw2_dir = PathBuf::from(&config.registry.cw2_dir);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_index_path(&cw2_dir));

    let index = generate_index(&cw2_dir, chrono::Utc::now())?;
    write_index(&index, &output)?;

    println!("index written: {}", output.display());
    println!("plugins: {}", index.statistics.total_plugins);
    println!("errors: {}", index.statistics.total_errors);
    for error in &index.errors {
        println!("  {}: {}", error.file, error.error);
    }
    Ok(())
}
