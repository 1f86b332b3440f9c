// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote manifest fetcher for Plugsync.
//!
//! Implements [`plugsync_core::ManifestSource`] over HTTP: resolves the raw
//! URL of a plugin's manifest on its declared branch, retrieves it, and
//! parses it fail-closed.

pub mod client;
pub mod manifest;
pub mod url;

pub use client::{ClientBuildError, HttpManifestFetcher};
pub use manifest::parse_manifest;
pub use url::manifest_url;
