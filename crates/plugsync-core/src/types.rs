// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin records, fetched manifests, and per-plugin sync outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::ErrorKind;

/// Date format used for `update_date` values written by the sync cycle.
pub const UPDATE_DATE_FORMAT: &str = "%Y/%m/%d";

/// The storage convention a plugin entry belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginFormat {
    /// Older convention: all entries in one shared index file.
    Legacy,
    /// Second-generation convention: one document per plugin.
    Cw2,
}

/// Host compatibility marker of a legacy entry (`plugin_ver`).
///
/// Older index files store it as a bare integer, newer ones as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompatibleVersion {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for CompatibleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatibleVersion::Number(n) => write!(f, "{n}"),
            CompatibleVersion::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Fields that exist in only one of the two storage conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatDetails {
    Legacy {
        compatible_version: CompatibleVersion,
    },
    Cw2 {
        api_version: String,
        readme: String,
        icon: Option<String>,
    },
}

/// One registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    pub id: String,
    pub name: String,
    /// Legacy records may store `null` here.
    pub description: Option<String>,
    pub version: String,
    pub author: String,
    pub source_url: String,
    pub branch: String,
    pub update_date: Option<String>,
    pub tags: Vec<String>,
    pub details: FormatDetails,
    /// Stored keys outside the known schema, written back unchanged.
    pub extra: Map<String, Value>,
}

impl PluginEntry {
    pub fn format(&self) -> PluginFormat {
        match self.details {
            FormatDetails::Legacy { .. } => PluginFormat::Legacy,
            FormatDetails::Cw2 { .. } => PluginFormat::Cw2,
        }
    }

    /// Where this plugin's remote manifest lives.
    pub fn location(&self) -> ManifestLocation {
        ManifestLocation {
            source_url: self.source_url.clone(),
            branch: self.branch.clone(),
            format: self.format(),
        }
    }
}

/// Repository reference used to retrieve a remote manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    pub source_url: String,
    pub branch: String,
    pub format: PluginFormat,
}

/// The fields read from a plugin's own remote manifest.
///
/// Only `version` is required; everything else is informational and never
/// written to the registry by automatic sync, except `update_date`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedManifest {
    pub version: String,
    pub update_date: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

/// Per-plugin outcome of a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SyncStatus {
    Updated,
    Unchanged,
    Failed,
}

/// Result of syncing one plugin during one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub id: String,
    pub status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl SyncResult {
    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: SyncStatus::Updated,
            error: None,
        }
    }

    pub fn unchanged(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: SyncStatus::Unchanged,
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            id: id.into(),
            status: SyncStatus::Failed,
            error: Some(kind),
        }
    }
}
