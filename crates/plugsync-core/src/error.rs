// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Plugsync manifest sync service.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::types::PluginFormat;

/// Coarse classification of a failure, recorded in per-plugin sync results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ErrorKind {
    NetworkUnavailable,
    NotFound,
    MalformedManifest,
    Timeout,
    SchemaMismatch,
    PersistenceFailure,
}

/// The primary error type used across fetcher, registry, and scheduler.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote host could not be reached or answered with a server error.
    #[error("network unavailable for {url}: {message}")]
    NetworkUnavailable {
        url: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No manifest exists at the well-known path.
    #[error("manifest not found at {url}")]
    ManifestNotFound { url: String },

    /// The requested plugin id is not present in the registry.
    #[error("plugin not found: {id}")]
    PluginNotFound { id: String },

    /// A manifest or stored document violates its schema.
    #[error("malformed manifest {location}: {message}")]
    MalformedManifest { location: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// An id is already registered under a different format.
    #[error("schema mismatch for `{id}`: stored as {existing}, incoming {incoming}")]
    SchemaMismatch {
        id: String,
        existing: PluginFormat,
        incoming: PluginFormat,
    },

    /// Writing the registry back to durable storage failed.
    #[error("persistence failure at {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SyncError {
    /// Reduces this error to the kind reported in a `SyncResult`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NetworkUnavailable { .. } => ErrorKind::NetworkUnavailable,
            SyncError::ManifestNotFound { .. } | SyncError::PluginNotFound { .. } => {
                ErrorKind::NotFound
            }
            SyncError::MalformedManifest { .. } => ErrorKind::MalformedManifest,
            SyncError::Timeout { .. } => ErrorKind::Timeout,
            SyncError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            SyncError::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
        }
    }

    /// Shorthand for a schema violation found in a document at `location`.
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::MalformedManifest {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Wraps an I/O or serialization failure while writing `path`.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SyncError::PersistenceFailure {
            path: path.into(),
            source: source.into(),
        }
    }
}
