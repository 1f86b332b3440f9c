// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field rules shared by index entries and remote manifests.

use std::sync::LazyLock;

use plugsync_core::{PluginEntry, PluginFormat};
use regex::Regex;

static GITHUB_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://github\.com/[\w.-]+/[\w.-]+/?$").unwrap());

static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._\-/]+$").unwrap());

static CW2_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").unwrap());

/// Whether `url` names a GitHub repository root.
pub fn is_github_repo_url(url: &str) -> bool {
    GITHUB_URL_RE.is_match(url)
}

pub fn is_valid_branch(branch: &str) -> bool {
    BRANCH_RE.is_match(branch)
}

/// CW2 ids: lowercase letters, digits, dots and hyphens, not starting or
/// ending with a dot or hyphen.
pub fn is_valid_cw2_id(id: &str) -> bool {
    CW2_ID_RE.is_match(id)
}

/// Every rule `entry` breaks, as human-readable messages.
pub fn check_entry(entry: &PluginEntry, allow_non_github: bool) -> Vec<String> {
    let mut problems = Vec::new();

    if entry.id.trim().is_empty() {
        problems.push("id must not be empty".to_string());
    }
    if entry.format() == PluginFormat::Cw2 && !is_valid_cw2_id(&entry.id) {
        problems.push(format!(
            "id `{}` may only contain lowercase letters, digits, dots and hyphens",
            entry.id
        ));
    }
    if entry.name.trim().is_empty() {
        problems.push("name must not be empty".to_string());
    }
    if entry.version.trim().is_empty() {
        problems.push("version must not be empty".to_string());
    }

    let url = entry.source_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        problems.push(format!("url `{url}` must start with http:// or https://"));
    } else if !allow_non_github && !is_github_repo_url(url) {
        problems.push(format!("url `{url}` is not a GitHub repository URL"));
    }

    if !is_valid_branch(&entry.branch) {
        problems.push(format!("branch `{}` contains invalid characters", entry.branch));
    }

    problems
}
