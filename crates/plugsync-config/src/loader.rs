// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./plugsync.toml` > `~/.config/plugsync/plugsync.toml`
//! > `/etc/plugsync/plugsync.toml` with environment variable overrides via
//! `PLUGSYNC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PlugsyncConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/plugsync/plugsync.toml` (system-wide)
/// 3. `~/.config/plugsync/plugsync.toml` (user XDG config)
/// 4. `./plugsync.toml` (local directory)
/// 5. `PLUGSYNC_*` environment variables
pub fn load_config() -> Result<PlugsyncConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PlugsyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlugsyncConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// The XDG files are still merged underneath, so an explicit `--config`
/// file only needs to contain the keys it changes.
pub fn load_config_from_path(path: &Path) -> Result<PlugsyncConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading explicit config file");
    base_figment()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    base_figment().merge(env_provider())
}

fn base_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PlugsyncConfig::default()))
        .merge(Toml::file("/etc/plugsync/plugsync.toml"))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file("plugsync.toml"))
}

/// `~/.config/plugsync/plugsync.toml` when a config dir is known.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("plugsync/plugsync.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PLUGSYNC_SYNC_INTERVAL_SECS` must map to `sync.interval_secs`,
/// not `sync.interval.secs`. `GITHUB_TOKEN` is honored as a fallback for
/// `fetch.github_token`.
fn env_provider() -> Figment {
    let prefixed = Env::prefixed("PLUGSYNC_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("service_", "service.", 1)
            .replacen("registry_", "registry.", 1)
            .replacen("fetch_", "fetch.", 1)
            .replacen("sync_", "sync.", 1);
        mapped.into()
    });

    let github_token = Env::raw()
        .only(&["GITHUB_TOKEN"])
        .map(|_| "fetch.github_token".into());

    Figment::new().merge(github_token).merge(prefixed)
}
