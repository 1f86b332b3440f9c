// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for the registry.
//!
//! `FileStore` reads and writes the two on-disk conventions side by side:
//! the legacy shared index file and the CW2 directory of per-plugin
//! documents. Every target is staged in a sibling temp file before any
//! rename, so a failure while writing leaves all previous files in place.
//! Each rename replaces one file atomically. The legacy index is renamed
//! last and stale CW2 documents are only removed after every rename, so a
//! failed rename never loses an entry.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use plugsync_core::{PluginEntry, PluginFormat, SyncError};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::document::{Cw2Document, LegacyRecord, to_pretty_json};
use crate::registry::Registry;
use crate::rules::check_entry;

/// Template document shipped in the CW2 directory; never a real plugin.
pub const CW2_TEMPLATE_FILE: &str = "example.plugin.id.json";

/// Storage seam used by the sync scheduler.
///
/// Implementations are synchronous: a registry is small and persisted once
/// per cycle.
pub trait RegistryBackend: Send + Sync {
    /// Read the full registry from storage.
    fn load(&self) -> Result<Registry, SyncError>;

    /// Write the full registry back to storage.
    fn persist(&self, registry: &Registry) -> Result<(), SyncError>;
}

/// One problem found while scanning the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreIssue {
    pub location: String,
    pub message: String,
}

impl fmt::Display for StoreIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl StoreIssue {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Everything read from disk, before it is assembled into a `Registry`.
#[derive(Debug, Default)]
struct Scan {
    entries: Vec<(String, PluginEntry)>,
    issues: Vec<StoreIssue>,
}

/// File-backed registry storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    legacy_path: PathBuf,
    cw2_dir: PathBuf,
    allow_non_github: bool,
}

impl FileStore {
    pub fn new(legacy_path: impl Into<PathBuf>, cw2_dir: impl Into<PathBuf>) -> Self {
        Self {
            legacy_path: legacy_path.into(),
            cw2_dir: cw2_dir.into(),
            allow_non_github: false,
        }
    }

    /// Accept any http(s) source URL instead of GitHub repositories only.
    pub fn allow_non_github(mut self, allow: bool) -> Self {
        self.allow_non_github = allow;
        self
    }

    pub fn legacy_path(&self) -> &Path {
        &self.legacy_path
    }

    pub fn cw2_dir(&self) -> &Path {
        &self.cw2_dir
    }

    /// Report every problem in both stores without stopping at the first.
    ///
    /// Covers unreadable or unparseable documents, CW2 file stems that do not
    /// match the inner id, ids present in both stores, and field rule
    /// violations.
    pub fn validate(&self) -> Vec<StoreIssue> {
        let Scan { entries, mut issues } = self.scan();

        let mut registry = Registry::new();
        for (location, entry) in entries {
            for problem in check_entry(&entry, self.allow_non_github) {
                issues.push(StoreIssue::new(location.clone(), problem));
            }
            if let Err(err) = registry.upsert(entry) {
                issues.push(StoreIssue::new(location, err.to_string()));
            }
        }
        issues
    }

    fn scan(&self) -> Scan {
        let mut scan = Scan::default();
        self.scan_legacy(&mut scan);
        self.scan_cw2(&mut scan);
        scan
    }

    fn scan_legacy(&self, scan: &mut Scan) {
        let path = &self.legacy_path;
        let location = path.display().to_string();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %location, "legacy index absent, starting empty");
                return;
            }
            Err(e) => {
                scan.issues.push(StoreIssue::new(location, format!("unreadable: {e}")));
                return;
            }
        };

        let map: Map<String, Value> = match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                scan.issues
                    .push(StoreIssue::new(location, "top level must be a JSON object"));
                return;
            }
            Err(e) => {
                scan.issues.push(StoreIssue::new(location, format!("invalid JSON: {e}")));
                return;
            }
        };

        for (id, value) in map {
            let entry_location = format!("{location}#{id}");
            match serde_json::from_value::<LegacyRecord>(value) {
                Ok(record) => scan.entries.push((entry_location, record.into_entry(id))),
                Err(e) => scan.issues.push(StoreIssue::new(entry_location, e.to_string())),
            }
        }
    }

    fn scan_cw2(&self, scan: &mut Scan) {
        let dir = &self.cw2_dir;
        let files = match list_cw2_files(dir) {
            Ok(files) => files,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "CW2 directory absent, starting empty");
                return;
            }
            Err(e) => {
                scan.issues
                    .push(StoreIssue::new(dir.display().to_string(), format!("unreadable: {e}")));
                return;
            }
        };

        for path in files {
            let location = path.display().to_string();
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    scan.issues.push(StoreIssue::new(location, format!("unreadable: {e}")));
                    continue;
                }
            };
            let doc = match serde_json::from_str::<Cw2Document>(&raw) {
                Ok(doc) => doc,
                Err(e) => {
                    scan.issues.push(StoreIssue::new(location, e.to_string()));
                    continue;
                }
            };

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if stem != doc.id {
                scan.issues.push(StoreIssue::new(
                    location,
                    format!("file name `{stem}` does not match id `{}`", doc.id),
                ));
                continue;
            }
            scan.entries.push((location, doc.into_entry()));
        }
    }

    fn cw2_path(&self, id: &str) -> PathBuf {
        self.cw2_dir.join(format!("{id}.json"))
    }
}

impl RegistryBackend for FileStore {
    /// Load both stores.
    ///
    /// Fails fast with `MalformedManifest` on the first unparseable document
    /// and with `SchemaMismatch` when an id exists in both stores. Field rule
    /// violations are logged but do not prevent loading.
    fn load(&self) -> Result<Registry, SyncError> {
        let Scan { entries, issues } = self.scan();
        if let Some(issue) = issues.into_iter().next() {
            return Err(SyncError::malformed(issue.location, issue.message));
        }

        let mut registry = Registry::new();
        for (location, entry) in entries {
            for problem in check_entry(&entry, self.allow_non_github) {
                warn!(location = %location, problem = %problem, "registry entry breaks a field rule");
            }
            registry.upsert(entry)?;
        }

        info!(
            legacy = registry.list_format(PluginFormat::Legacy).len(),
            cw2 = registry.list_format(PluginFormat::Cw2).len(),
            "registry loaded"
        );
        Ok(registry)
    }

    fn persist(&self, registry: &Registry) -> Result<(), SyncError> {
        let legacy = registry.list_format(PluginFormat::Legacy);
        let cw2 = registry.list_format(PluginFormat::Cw2);

        let mut staged = Vec::with_capacity(cw2.len() + 1);

        let mut keep = HashSet::new();
        for entry in &cw2 {
            let Some(doc) = Cw2Document::from_entry(entry) else {
                continue;
            };
            let target = self.cw2_path(&entry.id);
            let bytes = to_pretty_json(&doc).map_err(|e| SyncError::persistence(&target, e))?;
            staged.push(stage(&target, &bytes)?);
            keep.insert(target);
        }

        // Staged after the CW2 documents so it is renamed last.
        if !legacy.is_empty() || self.legacy_path.exists() {
            let mut map = Map::new();
            for entry in &legacy {
                if let Some(record) = LegacyRecord::from_entry(entry) {
                    let value = serde_json::to_value(record)
                        .map_err(|e| SyncError::persistence(&self.legacy_path, e))?;
                    map.insert(entry.id.clone(), value);
                }
            }
            let bytes = to_pretty_json(&map)
                .map_err(|e| SyncError::persistence(&self.legacy_path, e))?;
            staged.push(stage(&self.legacy_path, &bytes)?);
        }

        let written = staged.len();
        for (committed, (tmp, target)) in staged.into_iter().enumerate() {
            if let Err(e) = tmp.persist(&target) {
                error!(
                    target = %target.display(),
                    committed,
                    pending = written - committed,
                    "rename failed, earlier targets already replaced"
                );
                return Err(SyncError::persistence(&target, e.error));
            }
        }

        let mut removed = 0usize;
        if self.cw2_dir.is_dir() {
            let existing = list_cw2_files(&self.cw2_dir)
                .map_err(|e| SyncError::persistence(&self.cw2_dir, e))?;
            for path in existing.into_iter().filter(|p| !keep.contains(p)) {
                std::fs::remove_file(&path).map_err(|e| SyncError::persistence(&path, e))?;
                debug!(path = %path.display(), "removed stale CW2 document");
                removed += 1;
            }
        }

        debug!(written, removed, "registry persisted");
        Ok(())
    }
}

/// Writes `bytes` to a temp file next to `target`, creating the parent
/// directory when needed. The caller renames it into place.
pub(crate) fn stage(target: &Path, bytes: &[u8]) -> Result<(NamedTempFile, PathBuf), SyncError> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| SyncError::persistence(&parent, e))?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| SyncError::persistence(target, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| SyncError::persistence(target, e))?;
    Ok((tmp, target.to_path_buf()))
}

/// Sorted `*.json` files of a CW2 directory, without the template.
fn list_cw2_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dirent in std::fs::read_dir(dir)? {
        let path = dirent?.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let is_template = path.file_name().is_some_and(|name| name == CW2_TEMPLATE_FILE);
        if path.is_file() && is_json && !is_template {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::{CompatibleVersion, ErrorKind, FormatDetails};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(
            dir.path().join("Plugins/plugin_list.json"),
            dir.path().join("ClassWidgets2/plugins/manifest"),
        )
    }

    fn cw2(id: &str) -> PluginEntry {
        PluginEntry {
            id: id.into(),
            name: id.into(),
            description: Some(String::new()),
            version: "1.0.0".into(),
            author: "a".into(),
            source_url: format!("https://github.com/a/{id}"),
            branch: "main".into(),
            update_date: None,
            tags: vec![],
            details: FormatDetails::Cw2 {
                api_version: "1.0.0".into(),
                readme: "README.md".into(),
                icon: None,
            },
            extra: Default::default(),
        }
    }

    #[test]
    fn load_missing_stores_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = store(&dir).load().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn persist_of_empty_registry_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.persist(&Registry::new()).unwrap();
        assert!(!store.legacy_path().exists());
        assert!(!store.cw2_dir().exists());
    }

    #[test]
    fn stale_cw2_documents_are_removed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        registry.upsert(cw2("keep.me")).unwrap();
        registry.upsert(cw2("drop.me")).unwrap();
        store.persist(&registry).unwrap();

        std::fs::write(store.cw2_dir().join(CW2_TEMPLATE_FILE), "{}").unwrap();
        registry.remove("drop.me").unwrap();
        store.persist(&registry).unwrap();

        assert!(store.cw2_dir().join("keep.me.json").exists());
        assert!(!store.cw2_dir().join("drop.me.json").exists());
        assert!(store.cw2_dir().join(CW2_TEMPLATE_FILE).exists());
    }

    #[test]
    fn failed_legacy_rename_keeps_stale_documents() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        registry.upsert(cw2("old.one")).unwrap();
        store.persist(&registry).unwrap();

        // A directory in place of the legacy index makes its rename fail.
        std::fs::create_dir_all(store.legacy_path()).unwrap();
        registry.remove("old.one").unwrap();
        registry.upsert(cw2("new.one")).unwrap();
        registry
            .upsert(PluginEntry {
                details: FormatDetails::Legacy {
                    compatible_version: CompatibleVersion::Number(1),
                },
                ..cw2("legacy")
            })
            .unwrap();

        let err = store.persist(&registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(store.legacy_path().is_dir());
        assert!(store.cw2_dir().join("new.one.json").exists());
        assert!(store.cw2_dir().join("old.one.json").exists());
    }

    #[test]
    fn stem_mismatch_fails_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        registry.upsert(cw2("real.id")).unwrap();
        store.persist(&registry).unwrap();
        std::fs::rename(
            store.cw2_dir().join("real.id.json"),
            store.cw2_dir().join("other.id.json"),
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedManifest);
        assert!(err.to_string().contains("does not match id"));
    }

    #[test]
    fn id_in_both_stores_is_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        registry.upsert(cw2("twin")).unwrap();
        store.persist(&registry).unwrap();

        std::fs::create_dir_all(store.legacy_path().parent().unwrap()).unwrap();
        std::fs::write(
            store.legacy_path(),
            r#"{"twin": {"name": "Twin", "version": "1.0.0", "plugin_ver": 1,
                "author": "a", "url": "https://github.com/a/twin", "branch": "main"}}"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert_eq!(store.validate().len(), 1);
    }

    #[test]
    fn validate_collects_every_issue() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.cw2_dir()).unwrap();
        std::fs::write(store.cw2_dir().join("broken.json"), "{ nope").unwrap();
        std::fs::create_dir_all(store.legacy_path().parent().unwrap()).unwrap();
        std::fs::write(
            store.legacy_path(),
            r#"{
                "ok": {"name": "Ok", "version": "1.0.0", "plugin_ver": 1,
                       "author": "a", "url": "https://gitlab.com/a/ok", "branch": "main"},
                "bad": {"name": "Bad"}
            }"#,
        )
        .unwrap();

        let issues = store.validate();
        assert_eq!(issues.len(), 3, "got: {issues:?}");
        assert!(issues.iter().any(|i| i.location.ends_with("#bad")));
        assert!(issues.iter().any(|i| i.message.contains("not a GitHub")));
        assert!(issues.iter().any(|i| i.location.ends_with("broken.json")));
    }

    #[test]
    #[tracing_test::traced_test]
    fn rule_violations_only_warn_on_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        let mut entry = cw2("mirror");
        entry.source_url = "https://git.example.org/a/mirror".into();
        registry.upsert(entry).unwrap();
        store.persist(&registry).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(logs_contain("breaks a field rule"));

        let lenient = store.clone().allow_non_github(true);
        assert!(lenient.validate().is_empty());
    }

    #[test]
    fn legacy_order_survives_persist() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut registry = Registry::new();
        for id in ["zulu", "alpha", "mike"] {
            registry
                .upsert(PluginEntry {
                    details: FormatDetails::Legacy {
                        compatible_version: CompatibleVersion::Text("2".into()),
                    },
                    ..cw2(id)
                })
                .unwrap();
        }
        store.persist(&registry).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.ids(), vec!["zulu", "alpha", "mike"]);
    }
}
