// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for remote plugin manifests.
//!
//! Provides [`HttpManifestFetcher`] which builds the raw manifest URL for a
//! plugin, sends an authenticated GET, and maps every failure onto the
//! per-plugin error kinds.

use std::time::Duration;

use async_trait::async_trait;
use plugsync_config::model::FetchConfig;
use plugsync_core::{FetchedManifest, ManifestLocation, ManifestSource, PluginFormat, SyncError};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;
use tracing::debug;

use crate::manifest::parse_manifest;
use crate::url::manifest_url;

/// Failure to construct the HTTP client from configuration.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid header value for {header}: {source}")]
    InvalidHeader {
        header: &'static str,
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Fetches `plugin.json` / `cwplugin.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpManifestFetcher {
    client: reqwest::Client,
    timeout: Duration,
    raw_base_url: Option<String>,
    legacy_file: String,
    cw2_file: String,
}

impl HttpManifestFetcher {
    /// Creates a fetcher from the `[fetch]` config section.
    ///
    /// When a token is configured every request carries
    /// `Authorization: Bearer <token>`.
    pub fn new(config: &FetchConfig) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|source| {
                ClientBuildError::InvalidHeader {
                    header: "user-agent",
                    source,
                }
            })?,
        );
        if let Some(token) = config.github_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|source| {
                ClientBuildError::InvalidHeader {
                    header: "authorization",
                    source,
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            timeout,
            raw_base_url: config.raw_base_url.clone(),
            legacy_file: config.legacy_manifest_file.clone(),
            cw2_file: config.cw2_manifest_file.clone(),
        })
    }

    /// The URL a manifest for `location` is fetched from.
    pub fn url_for(&self, location: &ManifestLocation) -> Result<String, SyncError> {
        let file = match location.format {
            PluginFormat::Legacy => &self.legacy_file,
            PluginFormat::Cw2 => &self.cw2_file,
        };
        manifest_url(
            &location.source_url,
            &location.branch,
            file,
            self.raw_base_url.as_deref(),
        )
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> SyncError {
        if err.is_timeout() {
            SyncError::Timeout {
                duration: self.timeout,
            }
        } else {
            SyncError::NetworkUnavailable {
                url: url.to_string(),
                message: format!("HTTP request failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestFetcher {
    async fn fetch(&self, location: &ManifestLocation) -> Result<FetchedManifest, SyncError> {
        let url = self.url_for(location)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        debug!(status = %status, url = %url, "manifest response received");

        if is_gone(status) {
            return Err(SyncError::ManifestNotFound { url });
        }
        if !status.is_success() {
            return Err(SyncError::NetworkUnavailable {
                url,
                message: format!("server returned {status}"),
                source: None,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;
        parse_manifest(&url, &body)
    }
}

/// 404 and 410 mean the manifest does not exist on that branch.
fn is_gone(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE)
}
