// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, positive
//! intervals and bounds, a backoff threshold inside `[0, 1)`.

use crate::diagnostic::ConfigError;
use crate::model::PlugsyncConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &PlugsyncConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "service.log_level `{}` must be one of: {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.registry.legacy_path.trim().is_empty() {
        errors.push(ConfigError::validation("registry.legacy_path must not be empty"));
    }

    if config.registry.cw2_dir.trim().is_empty() {
        errors.push(ConfigError::validation("registry.cw2_dir must not be empty"));
    }

    if config.fetch.timeout_secs == 0 {
        errors.push(ConfigError::validation("fetch.timeout_secs must be at least 1"));
    }

    for (key, file) in [
        ("fetch.legacy_manifest_file", &config.fetch.legacy_manifest_file),
        ("fetch.cw2_manifest_file", &config.fetch.cw2_manifest_file),
    ] {
        if file.trim().is_empty() || file.contains('/') {
            errors.push(ConfigError::validation(format!(
                "{key} must be a bare file name, got `{file}`"
            )));
        }
    }

    if let Some(base) = &config.fetch.raw_base_url
        && !(base.starts_with("http://") || base.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "fetch.raw_base_url must start with http:// or https://, got `{base}`"
        )));
    }

    if config.sync.interval_secs == 0 {
        errors.push(ConfigError::validation("sync.interval_secs must be at least 1"));
    }

    if config.sync.max_concurrent_fetches == 0 {
        errors.push(ConfigError::validation(
            "sync.max_concurrent_fetches must be at least 1",
        ));
    }

    let threshold = config.sync.backoff_threshold;
    if !(0.0..1.0).contains(&threshold) {
        errors.push(ConfigError::validation(format!(
            "sync.backoff_threshold must be in [0.0, 1.0), got {threshold}"
        )));
    }

    if config.sync.max_backoff_secs < config.sync.interval_secs {
        errors.push(ConfigError::validation(format!(
            "sync.max_backoff_secs ({}) must not be lower than sync.interval_secs ({})",
            config.sync.max_backoff_secs, config.sync.interval_secs
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
