// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw manifest URL construction.

use plugsync_core::SyncError;

/// Raw content host for GitHub repositories.
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

const GITHUB_PREFIX: &str = "https://github.com/";

/// Builds the URL of `file` at the root of `source_url` on `branch`.
///
/// GitHub repositories go through the raw content host (or `raw_base` when
/// set). Any other http(s) host is assumed to serve `<url>/raw/<branch>/`.
pub fn manifest_url(
    source_url: &str,
    branch: &str,
    file: &str,
    raw_base: Option<&str>,
) -> Result<String, SyncError> {
    if let Some(repo) = github_repo(source_url) {
        let base = raw_base.unwrap_or(GITHUB_RAW_BASE).trim_end_matches('/');
        return Ok(format!("{base}/{repo}/{branch}/{file}"));
    }

    if source_url.starts_with("http://") || source_url.starts_with("https://") {
        let url = source_url.trim_end_matches('/');
        return Ok(format!("{url}/raw/{branch}/{file}"));
    }

    Err(SyncError::malformed(
        source_url,
        "source url must start with http:// or https://",
    ))
}

/// `owner/repo` of a GitHub repository URL, without a trailing `/` or `.git`.
fn github_repo(url: &str) -> Option<&str> {
    let rest = url.strip_prefix(GITHUB_PREFIX)?.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    (!owner.is_empty() && !repo.is_empty() && !repo.contains('/')).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::ErrorKind;

    #[test]
    fn github_urls_use_raw_host() {
        let url = manifest_url("https://github.com/a/weather", "main", "plugin.json", None).unwrap();
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/a/weather/main/plugin.json"
        );
    }

    #[test]
    fn github_suffixes_are_stripped() {
        for source in [
            "https://github.com/a/clock/",
            "https://github.com/a/clock.git",
            "https://github.com/a/clock.git/",
        ] {
            let url = manifest_url(source, "dev", "cwplugin.json", None).unwrap();
            assert_eq!(url, "https://raw.githubusercontent.com/a/clock/dev/cwplugin.json");
        }
    }

    #[test]
    fn raw_base_override() {
        let url = manifest_url(
            "https://github.com/a/b",
            "main",
            "plugin.json",
            Some("http://127.0.0.1:9999/"),
        )
        .unwrap();
        assert_eq!(url, "http://127.0.0.1:9999/a/b/main/plugin.json");
    }

    #[test]
    fn other_hosts_use_raw_path() {
        let url =
            manifest_url("https://git.example.org/a/b/", "main", "plugin.json", None).unwrap();
        assert_eq!(url, "https://git.example.org/a/b/raw/main/plugin.json");

        let deep = manifest_url("https://github.com/a/b/tree/x", "main", "plugin.json", None)
            .unwrap();
        assert_eq!(deep, "https://github.com/a/b/tree/x/raw/main/plugin.json");
    }

    #[test]
    fn non_http_is_rejected() {
        let err = manifest_url("git@github.com:a/b.git", "main", "plugin.json", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
    }
}
