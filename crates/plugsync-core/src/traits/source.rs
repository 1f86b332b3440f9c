// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest source trait implemented by the HTTP fetcher and test mocks.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::types::{FetchedManifest, ManifestLocation};

/// Retrieves and parses the remote manifest of one plugin.
///
/// Implementations must fail closed: a document missing required fields is
/// an error, never a partially filled [`FetchedManifest`]. Fetching has no
/// side effects.
#[async_trait]
pub trait ManifestSource: Send + Sync + 'static {
    async fn fetch(&self, location: &ManifestLocation) -> Result<FetchedManifest, SyncError>;
}
