// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Plugsync service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Plugsync configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlugsyncConfig {
    /// Process-level settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Where the two plugin stores live on disk.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Remote manifest retrieval settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Sync cycle scheduling settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Plugin store locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Shared index file holding every legacy entry.
    #[serde(default = "default_legacy_path")]
    pub legacy_path: String,

    /// Directory holding one `<id>.json` document per CW2 plugin.
    #[serde(default = "default_cw2_dir")]
    pub cw2_dir: String,

    /// Accept any http(s) source URL instead of only GitHub repositories.
    #[serde(default)]
    pub allow_non_github: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            legacy_path: default_legacy_path(),
            cw2_dir: default_cw2_dir(),
            allow_non_github: false,
        }
    }
}

fn default_legacy_path() -> String {
    "Plugins/plugin_list.json".to_string()
}

fn default_cw2_dir() -> String {
    "ClassWidgets2/plugins/manifest".to_string()
}

/// Remote manifest retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent to the raw content host. Falls back to `GITHUB_TOKEN`.
    #[serde(default)]
    pub github_token: Option<String>,

    /// Base URL replacing `https://raw.githubusercontent.com` for GitHub sources.
    #[serde(default)]
    pub raw_base_url: Option<String>,

    /// Manifest file name published by legacy plugins.
    #[serde(default = "default_legacy_manifest_file")]
    pub legacy_manifest_file: String,

    /// Manifest file name published by CW2 plugins.
    #[serde(default = "default_cw2_manifest_file")]
    pub cw2_manifest_file: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            github_token: None,
            raw_base_url: None,
            legacy_manifest_file: default_legacy_manifest_file(),
            cw2_manifest_file: default_cw2_manifest_file(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_legacy_manifest_file() -> String {
    "plugin.json".to_string()
}

fn default_cw2_manifest_file() -> String {
    "cwplugin.json".to_string()
}

fn default_user_agent() -> String {
    concat!("plugsync/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Sync cycle scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Nominal wait between cycles in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum number of manifest fetches in flight at once.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Failure fraction above which the scheduler enters backoff.
    #[serde(default = "default_backoff_threshold")]
    pub backoff_threshold: f64,

    /// Upper bound for the doubled wait while in backoff, in seconds.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// A cycle running longer than this is logged as slow. Informative only.
    #[serde(default = "default_cycle_warn_secs")]
    pub cycle_warn_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            backoff_threshold: default_backoff_threshold(),
            max_backoff_secs: default_max_backoff_secs(),
            cycle_warn_secs: default_cycle_warn_secs(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    pub fn cycle_warn(&self) -> Duration {
        Duration::from_secs(self.cycle_warn_secs)
    }
}

fn default_interval_secs() -> u64 {
    30 * 60
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_backoff_threshold() -> f64 {
    0.5
}

fn default_max_backoff_secs() -> u64 {
    4 * 60 * 60
}

fn default_cycle_warn_secs() -> u64 {
    10 * 60
}
