// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Plugsync manifest sync service.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use plugsync_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("sync every {}s", config.sync.interval_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PlugsyncConfig;

/// Load configuration and validate it.
///
/// With `explicit` set, that file is merged on top of the XDG hierarchy;
/// otherwise only the hierarchy and env vars are used. Figment errors are
/// converted into diagnostics carrying source spans where possible.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<PlugsyncConfig, Vec<ConfigError>> {
    if let Some(path) = explicit
        && !path.exists()
    {
        return Err(vec![ConfigError::Other(format!(
            "config file not found: {}",
            path.display()
        ))]);
    }

    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };

    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PlugsyncConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every TOML file that may have contributed to the config, for spans.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/plugsync/plugsync.toml")];
    candidates.extend(loader::user_config_path());
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("plugsync.toml"));
    }
    candidates.extend(explicit.map(Path::to_path_buf));

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
