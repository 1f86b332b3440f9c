// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry fixtures for integration testing.
//!
//! Provides entry builders, a fixed clock, an in-memory backend that counts
//! persists, and `TempStore`, a `FileStore` rooted in a temp directory.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use plugsync_core::{
    Clock, CompatibleVersion, FormatDetails, PluginEntry, SyncError,
};
use plugsync_registry::{FileStore, Registry, RegistryBackend};
use tempfile::TempDir;

/// A legacy entry whose repository is `https://github.com/test/<id>`.
pub fn legacy_entry(id: &str, version: &str) -> PluginEntry {
    PluginEntry {
        id: id.to_string(),
        name: format!("Plugin {id}"),
        description: Some(format!("Test plugin {id}")),
        version: version.to_string(),
        author: "tester".to_string(),
        source_url: repo_url(id),
        branch: "main".to_string(),
        update_date: Some("2024/01/01".to_string()),
        tags: vec!["test".to_string()],
        details: FormatDetails::Legacy {
            compatible_version: CompatibleVersion::Number(1),
        },
        extra: Default::default(),
    }
}

/// A CW2 entry whose repository is `https://github.com/test/<id>`.
pub fn cw2_entry(id: &str, version: &str) -> PluginEntry {
    PluginEntry {
        update_date: None,
        details: FormatDetails::Cw2 {
            api_version: "1.0.0".to_string(),
            readme: "README.md".to_string(),
            icon: None,
        },
        ..legacy_entry(id, version)
    }
}

/// Repository URL used by the entry builders.
pub fn repo_url(id: &str) -> String {
    format!("https://github.com/test/{id}")
}

/// Registry holding `entries`, in order.
pub fn registry_of(entries: impl IntoIterator<Item = PluginEntry>) -> Registry {
    let mut registry = Registry::new();
    for entry in entries {
        // Builders never mix formats for one id.
        let _ = registry.upsert(entry);
    }
    registry
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 8, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// In-memory backend that records every persisted registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    stored: Arc<Mutex<Registry>>,
    persists: Arc<AtomicUsize>,
    fail_persist: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            stored: Arc::new(Mutex::new(registry)),
            ..Self::default()
        }
    }

    /// Number of successful and failed persist calls.
    pub fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    /// The registry as last persisted (or as seeded).
    pub fn stored(&self) -> Registry {
        self.stored.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Make subsequent persists fail with `PersistenceFailure`.
    pub fn fail_persists(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }
}

impl RegistryBackend for MemoryBackend {
    fn load(&self) -> Result<Registry, SyncError> {
        Ok(self.stored())
    }

    fn persist(&self, registry: &Registry) -> Result<(), SyncError> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(SyncError::persistence("memory", "persist disabled by test"));
        }
        if let Ok(mut stored) = self.stored.lock() {
            *stored = registry.clone();
        }
        Ok(())
    }
}

/// A `FileStore` laid out like a plugin directory checkout in a temp dir.
pub struct TempStore {
    dir: TempDir,
    store: FileStore,
}

impl TempStore {
    pub fn new() -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let store = FileStore::new(
            dir.path().join("Plugins/plugin_list.json"),
            dir.path().join("ClassWidgets2/plugins/manifest"),
        );
        Ok(Self { dir, store })
    }

    /// Creates the store and persists `entries` into it.
    pub fn seeded(entries: impl IntoIterator<Item = PluginEntry>) -> Result<Self, SyncError> {
        let temp = Self::new().map_err(|e| SyncError::persistence("tempdir", e))?;
        temp.store.persist(&registry_of(entries))?;
        Ok(temp)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Raw bytes of the legacy index file.
    pub fn legacy_bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.store.legacy_path())
    }

    /// Raw bytes of one CW2 document.
    pub fn cw2_bytes(&self, id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.store.cw2_dir().join(format!("{id}.json")))
    }
}
