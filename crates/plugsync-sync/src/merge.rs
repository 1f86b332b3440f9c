// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge of fetched manifests into stored entries.
//!
//! Only `version` and `update_date` are ever touched. A version is replaced
//! whenever the fetched string differs from the stored one, downgrades
//! included.

use plugsync_core::{FetchedManifest, PluginEntry, SyncError, SyncResult, SyncStatus};
use plugsync_registry::Registry;
use tracing::{debug, info, warn};

/// Applies `fetched` to `entry`, returning whether anything changed.
///
/// `update_date` comes from the manifest when it declares one, else it is
/// the cycle's `run_date`.
pub fn merge_entry(entry: &mut PluginEntry, fetched: &FetchedManifest, run_date: &str) -> SyncStatus {
    if entry.version == fetched.version {
        return SyncStatus::Unchanged;
    }

    entry.version = fetched.version.clone();
    entry.update_date = Some(
        fetched
            .update_date
            .clone()
            .unwrap_or_else(|| run_date.to_string()),
    );
    SyncStatus::Updated
}

/// Folds one fetch outcome into `registry` and logs the result.
///
/// A failed fetch leaves the stored entry untouched.
pub fn apply_fetch(
    registry: &mut Registry,
    id: &str,
    fetched: Result<FetchedManifest, SyncError>,
    run_date: &str,
) -> SyncResult {
    let manifest = match fetched {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(id = %id, kind = %err.kind(), error = %err, "manifest fetch failed");
            return SyncResult::failed(id, err.kind());
        }
    };

    let mut entry = match registry.get(id) {
        Ok(entry) => entry.clone(),
        Err(err) => return SyncResult::failed(id, err.kind()),
    };
    let previous = entry.version.clone();

    match merge_entry(&mut entry, &manifest, run_date) {
        SyncStatus::Updated => {
            let update_date = entry.update_date.clone().unwrap_or_default();
            if let Err(err) = registry.upsert(entry) {
                warn!(id = %id, error = %err, "merged entry rejected by registry");
                return SyncResult::failed(id, err.kind());
            }
            info!(
                id = %id,
                from = %previous,
                to = %manifest.version,
                update_date = %update_date,
                "plugin updated"
            );
            SyncResult::updated(id)
        }
        _ => {
            debug!(id = %id, version = %previous, "plugin unchanged");
            SyncResult::unchanged(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::{CompatibleVersion, ErrorKind, FormatDetails};

    fn foo() -> PluginEntry {
        PluginEntry {
            id: "foo".into(),
            name: "Foo".into(),
            description: Some("Foo plugin".into()),
            version: "1.0.0".into(),
            author: "a".into(),
            source_url: "https://github.com/a/foo".into(),
            branch: "main".into(),
            update_date: Some("2023/01/01".into()),
            tags: vec!["x".into()],
            details: FormatDetails::Legacy {
                compatible_version: CompatibleVersion::Number(1),
            },
            extra: Default::default(),
        }
    }

    fn manifest(version: &str, update_date: Option<&str>) -> FetchedManifest {
        FetchedManifest {
            version: version.into(),
            update_date: update_date.map(str::to_string),
            name: Some("Renamed upstream".into()),
            ..FetchedManifest::default()
        }
    }

    #[test]
    fn new_version_stamps_run_date() {
        let mut entry = foo();
        let status = merge_entry(&mut entry, &manifest("1.2.0", None), "2024/03/05");
        assert_eq!(status, SyncStatus::Updated);
        assert_eq!(entry.version, "1.2.0");
        assert_eq!(entry.update_date.as_deref(), Some("2024/03/05"));
        assert_eq!(entry.name, "Foo");
    }

    #[test]
    fn manifest_date_wins_over_run_date() {
        let mut entry = foo();
        merge_entry(&mut entry, &manifest("1.2.0", Some("2024/02/29")), "2024/03/05");
        assert_eq!(entry.update_date.as_deref(), Some("2024/02/29"));
    }

    #[test]
    fn same_version_is_unchanged() {
        let mut entry = foo();
        let status = merge_entry(&mut entry, &manifest("1.0.0", Some("2030/01/01")), "2024/03/05");
        assert_eq!(status, SyncStatus::Unchanged);
        assert_eq!(entry, foo());
    }

    #[test]
    fn downgrade_is_applied() {
        let mut entry = foo();
        let status = merge_entry(&mut entry, &manifest("0.9.0", None), "2024/03/05");
        assert_eq!(status, SyncStatus::Updated);
        assert_eq!(entry.version, "0.9.0");
    }

    #[test]
    fn failed_fetch_keeps_entry() {
        let mut registry = Registry::new();
        registry.upsert(foo()).unwrap();

        let result = apply_fetch(
            &mut registry,
            "foo",
            Err(SyncError::ManifestNotFound {
                url: "https://raw/foo".into(),
            }),
            "2024/03/05",
        );
        assert_eq!(result, SyncResult::failed("foo", ErrorKind::NotFound));
        assert_eq!(registry.get("foo").unwrap(), &foo());
    }

    #[test]
    fn apply_updates_registry() {
        let mut registry = Registry::new();
        registry.upsert(foo()).unwrap();

        let result = apply_fetch(&mut registry, "foo", Ok(manifest("2.0", None)), "2024/03/05");
        assert_eq!(result, SyncResult::updated("foo"));
        assert_eq!(registry.get("foo").unwrap().version, "2.0");
    }
}
