// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock manifest source for deterministic testing.
//!
//! `MockSource` implements `ManifestSource` with canned per-repository
//! responses, so sync cycles run without network access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use plugsync_core::{ErrorKind, FetchedManifest, ManifestLocation, ManifestSource, SyncError};

/// What the mock answers for one repository.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A manifest with this version and no `update_date`.
    Version(String),
    /// A full manifest.
    Manifest(FetchedManifest),
    /// A failure of the given kind.
    Fail(ErrorKind),
    /// Never completes; only a timeout or cancellation ends the fetch.
    Hang,
}

/// A mock manifest source keyed by repository URL.
///
/// Unknown repositories answer `NotFound`. Every call is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    responses: HashMap<String, (MockResponse, Duration)>,
    calls: Arc<Mutex<Vec<ManifestLocation>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer fetches of `source_url` with `response`.
    pub fn respond(mut self, source_url: impl Into<String>, response: MockResponse) -> Self {
        self.responses
            .insert(source_url.into(), (response, Duration::ZERO));
        self
    }

    /// Like [`respond`](Self::respond), after sleeping `delay`.
    pub fn respond_after(
        mut self,
        source_url: impl Into<String>,
        response: MockResponse,
        delay: Duration,
    ) -> Self {
        self.responses.insert(source_url.into(), (response, delay));
        self
    }

    /// Locations fetched so far, in call order.
    pub async fn calls(&self) -> Vec<ManifestLocation> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

/// Builds a representative `SyncError` for `kind`.
pub fn error_for(kind: ErrorKind, url: &str) -> SyncError {
    match kind {
        ErrorKind::NetworkUnavailable => SyncError::NetworkUnavailable {
            url: url.to_string(),
            message: "connection refused".to_string(),
            source: None,
        },
        ErrorKind::NotFound => SyncError::ManifestNotFound {
            url: url.to_string(),
        },
        ErrorKind::MalformedManifest => SyncError::malformed(url, "`version` is missing"),
        ErrorKind::Timeout => SyncError::Timeout {
            duration: Duration::from_secs(30),
        },
        ErrorKind::SchemaMismatch => SyncError::SchemaMismatch {
            id: url.to_string(),
            existing: plugsync_core::PluginFormat::Legacy,
            incoming: plugsync_core::PluginFormat::Cw2,
        },
        ErrorKind::PersistenceFailure => SyncError::persistence(url, "disk full"),
    }
}

#[async_trait]
impl ManifestSource for MockSource {
    async fn fetch(&self, location: &ManifestLocation) -> Result<FetchedManifest, SyncError> {
        self.calls.lock().await.push(location.clone());

        let url = location.source_url.as_str();
        let Some((response, delay)) = self.responses.get(url) else {
            return Err(error_for(ErrorKind::NotFound, url));
        };

        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }

        match response {
            MockResponse::Version(version) => Ok(FetchedManifest {
                version: version.clone(),
                ..FetchedManifest::default()
            }),
            MockResponse::Manifest(manifest) => Ok(manifest.clone()),
            MockResponse::Fail(kind) => Err(error_for(*kind, url)),
            MockResponse::Hang => std::future::pending().await,
        }
    }
}
