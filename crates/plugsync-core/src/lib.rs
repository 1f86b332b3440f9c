// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Plugsync manifest sync service.
//!
//! This crate provides the plugin entry model shared by the legacy and CW2
//! storage conventions, the error kinds reported per plugin, and the seam
//! traits (manifest source, clock) the scheduler is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, SyncError};
pub use traits::{Clock, ManifestSource, SystemClock};
pub use types::{
    CompatibleVersion, FetchedManifest, FormatDetails, ManifestLocation, PluginEntry,
    PluginFormat, SyncResult, SyncStatus, UPDATE_DATE_FORMAT,
};
