// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk document shapes for the two storage conventions.
//!
//! Legacy records live inside one shared map keyed by plugin id and carry
//! their tags as a single ` | `-joined string. CW2 documents are standalone
//! files that repeat their own id and carry tags as an array.
//!
//! Keys outside the known fields are collected into `extra` and written
//! back after the known ones, so a load/persist pass never drops data.

use plugsync_core::{CompatibleVersion, FormatDetails, PluginEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between tags in a legacy `tag` field.
pub const LEGACY_TAG_SEPARATOR: &str = " | ";

/// Default readme path of a CW2 plugin.
pub const DEFAULT_README: &str = "README.md";

/// One value of the legacy index map. The id is the map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub plugin_ver: CompatibleVersion,
    pub author: String,
    pub url: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LegacyRecord {
    pub fn into_entry(self, id: String) -> PluginEntry {
        PluginEntry {
            id,
            name: self.name,
            description: self.description,
            version: self.version,
            author: self.author,
            source_url: self.url,
            branch: self.branch,
            update_date: self.update_date,
            tags: split_tags(&self.tag),
            details: FormatDetails::Legacy {
                compatible_version: self.plugin_ver,
            },
            extra: self.extra,
        }
    }

    /// Builds the record for a legacy entry; `None` for a CW2 entry.
    pub fn from_entry(entry: &PluginEntry) -> Option<Self> {
        let FormatDetails::Legacy { compatible_version } = &entry.details else {
            return None;
        };
        Some(Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            version: entry.version.clone(),
            plugin_ver: compatible_version.clone(),
            author: entry.author.clone(),
            url: entry.source_url.clone(),
            branch: entry.branch.clone(),
            update_date: entry.update_date.clone(),
            tag: entry.tags.join(LEGACY_TAG_SEPARATOR),
            extra: entry.extra.clone(),
        })
    }
}

/// A standalone CW2 `<id>.json` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cw2Document {
    pub id: String,
    pub name: String,
    pub version: String,
    pub api_version: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub branch: String,
    #[serde(default = "default_readme")]
    pub readme: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_readme() -> String {
    DEFAULT_README.to_string()
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Cw2Document {
    pub fn into_entry(self) -> PluginEntry {
        PluginEntry {
            id: self.id,
            name: self.name,
            description: Some(self.description),
            version: self.version,
            author: self.author,
            source_url: self.url,
            branch: self.branch,
            update_date: self.update_date,
            tags: self.tags,
            details: FormatDetails::Cw2 {
                api_version: self.api_version,
                readme: self.readme,
                icon: self.icon,
            },
            extra: self.extra,
        }
    }

    /// Builds the document for a CW2 entry; `None` for a legacy entry.
    pub fn from_entry(entry: &PluginEntry) -> Option<Self> {
        let FormatDetails::Cw2 {
            api_version,
            readme,
            icon,
        } = &entry.details
        else {
            return None;
        };
        Some(Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            version: entry.version.clone(),
            api_version: api_version.clone(),
            description: entry.description.clone().unwrap_or_default(),
            author: entry.author.clone(),
            url: entry.source_url.clone(),
            branch: entry.branch.clone(),
            readme: readme.clone(),
            icon: icon.clone(),
            tags: entry.tags.clone(),
            update_date: entry.update_date.clone(),
            extra: entry.extra.clone(),
        })
    }
}

/// Splits a legacy `tag` string. Whitespace around entries is dropped and
/// empty entries are skipped, so `"a|b"` and `"a | b"` read the same.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serializes with four-space indentation, keeping non-ASCII text as is.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
