// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory plugin registry.
//!
//! The `Registry` stores `PluginEntry` records keyed by plugin id across both
//! storage conventions. Legacy entries remember the order they were loaded or
//! inserted in, matching their shared index file; CW2 entries are listed in
//! lexical id order, matching a directory listing of per-plugin files.

use std::collections::HashMap;

use plugsync_core::{PluginEntry, PluginFormat, SyncError};

/// Registry of known plugins keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: HashMap<String, PluginEntry>,
    legacy_order: Vec<String>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a plugin entry by id.
    pub fn get(&self, id: &str) -> Result<&PluginEntry, SyncError> {
        self.entries
            .get(id)
            .ok_or_else(|| SyncError::PluginNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// List all entries: legacy in insertion order, then CW2 by id.
    pub fn list(&self) -> Vec<&PluginEntry> {
        let mut all: Vec<&PluginEntry> = self
            .legacy_order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .collect();
        all.extend(self.list_format(PluginFormat::Cw2));
        all
    }

    /// Entries of one format, in that format's listing order.
    pub fn list_format(&self, format: PluginFormat) -> Vec<&PluginEntry> {
        match format {
            PluginFormat::Legacy => self
                .legacy_order
                .iter()
                .filter_map(|id| self.entries.get(id))
                .collect(),
            PluginFormat::Cw2 => {
                let mut cw2: Vec<&PluginEntry> = self
                    .entries
                    .values()
                    .filter(|e| e.format() == PluginFormat::Cw2)
                    .collect();
                cw2.sort_by(|a, b| a.id.cmp(&b.id));
                cw2
            }
        }
    }

    /// Ids of every entry in listing order.
    pub fn ids(&self) -> Vec<String> {
        self.list().into_iter().map(|e| e.id.clone()).collect()
    }

    /// Insert or replace the entry for `entry.id`.
    ///
    /// Returns the previous entry when one was replaced. Fails with
    /// `SchemaMismatch` if the id is already stored under the other format;
    /// the registry is left untouched in that case.
    pub fn upsert(&mut self, entry: PluginEntry) -> Result<Option<PluginEntry>, SyncError> {
        if let Some(existing) = self.entries.get(&entry.id)
            && existing.format() != entry.format()
        {
            return Err(SyncError::SchemaMismatch {
                id: entry.id.clone(),
                existing: existing.format(),
                incoming: entry.format(),
            });
        }

        if entry.format() == PluginFormat::Legacy && !self.entries.contains_key(&entry.id) {
            self.legacy_order.push(entry.id.clone());
        }
        Ok(self.entries.insert(entry.id.clone(), entry))
    }

    /// Remove an entry, returning it.
    pub fn remove(&mut self, id: &str) -> Result<PluginEntry, SyncError> {
        let removed = self
            .entries
            .remove(id)
            .ok_or_else(|| SyncError::PluginNotFound { id: id.to_string() })?;
        self.legacy_order.retain(|existing| existing != id);
        Ok(removed)
    }

    /// Case-insensitive substring search over id, name, description and tags.
    pub fn search(&self, query: &str) -> Vec<&PluginEntry> {
        let needle = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|e| {
                e.id.to_lowercase().contains(&needle)
                    || e.name.to_lowercase().contains(&needle)
                    || e
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || e.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugsync_core::{CompatibleVersion, ErrorKind, FormatDetails};

    fn legacy(id: &str) -> PluginEntry {
        PluginEntry {
            id: id.to_string(),
            name: format!("Plugin {id}"),
            description: Some(format!("Test plugin {id}")),
            version: "1.0.0".to_string(),
            author: "tester".to_string(),
            source_url: format!("https://github.com/tester/{id}"),
            branch: "main".to_string(),
            update_date: Some("2024/01/01".to_string()),
            tags: vec!["tools".to_string()],
            details: FormatDetails::Legacy {
                compatible_version: CompatibleVersion::Number(1),
            },
            extra: Default::default(),
        }
    }

    fn cw2(id: &str) -> PluginEntry {
        PluginEntry {
            details: FormatDetails::Cw2 {
                api_version: "1.0.0".to_string(),
                readme: "README.md".to_string(),
                icon: None,
            },
            update_date: None,
            ..legacy(id)
        }
    }

    #[test]
    fn upsert_and_get_roundtrip() {
        let mut registry = Registry::new();
        assert!(registry.upsert(legacy("foo")).unwrap().is_none());

        let entry = registry.get("foo").unwrap();
        assert_eq!(entry.name, "Plugin foo");
        assert_eq!(entry.format(), PluginFormat::Legacy);
    }

    #[test]
    fn get_missing_is_not_found() {
        let registry = Registry::new();
        let err = registry.get("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn upsert_replaces_same_format() {
        let mut registry = Registry::new();
        registry.upsert(legacy("foo")).unwrap();

        let mut newer = legacy("foo");
        newer.version = "2.0.0".to_string();
        let previous = registry.upsert(newer).unwrap().unwrap();

        assert_eq!(previous.version, "1.0.0");
        assert_eq!(registry.get("foo").unwrap().version, "2.0.0");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.ids(), vec!["foo"]);
    }

    #[test]
    fn upsert_across_formats_is_schema_mismatch() {
        let mut registry = Registry::new();
        registry.upsert(legacy("dup")).unwrap();

        let err = registry.upsert(cw2("dup")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert_eq!(registry.get("dup").unwrap().format(), PluginFormat::Legacy);
    }

    #[test]
    fn list_orders_legacy_by_insertion_then_cw2_by_id() {
        let mut registry = Registry::new();
        registry.upsert(cw2("zeta")).unwrap();
        registry.upsert(legacy("zebra")).unwrap();
        registry.upsert(cw2("alpha")).unwrap();
        registry.upsert(legacy("apple")).unwrap();

        assert_eq!(registry.ids(), vec!["zebra", "apple", "alpha", "zeta"]);
    }

    #[test]
    fn remove_drops_from_order() {
        let mut registry = Registry::new();
        registry.upsert(legacy("a")).unwrap();
        registry.upsert(legacy("b")).unwrap();

        registry.remove("a").unwrap();
        registry.upsert(legacy("a")).unwrap();

        assert_eq!(registry.ids(), vec!["b", "a"]);
        assert!(registry.remove("missing").is_err());
    }

    #[test]
    fn search_matches_tags_case_insensitively() {
        let mut registry = Registry::new();
        let mut weather = legacy("weather");
        weather.tags = vec!["Forecast".to_string()];
        registry.upsert(weather).unwrap();
        registry.upsert(cw2("clock")).unwrap();

        let hits = registry.search("forecast");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "weather");
        assert_eq!(registry.search("PLUGIN").len(), 2);
    }

    #[test]
    fn len_and_is_empty() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.upsert(cw2("x1")).unwrap();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
