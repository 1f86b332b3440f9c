// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors surfaced by the command-line entry points.

use plugsync_core::SyncError;
use plugsync_fetch::ClientBuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{count} problem(s) found in the plugin stores")]
    Invalid { count: usize },

    #[error("sync cycle cancelled")]
    Cancelled,

    #[error("registry was not persisted ({kind})")]
    NotPersisted { kind: plugsync_core::ErrorKind },
}
