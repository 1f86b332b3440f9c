// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CW2 plugin index generation.
//!
//! Scans the CW2 manifest directory and produces `index.json`: every parsed
//! document sorted by id, summary statistics, and the files that could not
//! be read. Documents are copied as-is so fields added later still reach the
//! index.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use plugsync_core::SyncError;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::store::{CW2_TEMPLATE_FILE, stage};

/// File name of the generated index.
pub const INDEX_FILE_NAME: &str = "index.json";

const REQUIRED_FIELDS: &[&str] = &["id", "name", "version"];

#[derive(Debug, Clone, Serialize)]
pub struct PluginIndex {
    pub metadata: IndexMetadata,
    pub statistics: IndexStatistics,
    pub plugins: Vec<Map<String, Value>>,
    pub errors: Vec<IndexError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexMetadata {
    pub generated_at: String,
    pub manifest_directory: String,
    pub total_files_scanned: usize,
    pub generator_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStatistics {
    pub total_plugins: usize,
    pub total_errors: usize,
    pub unique_authors: Vec<String>,
    pub version_distribution: BTreeMap<String, usize>,
    /// Tag counts, most used first.
    pub tag_distribution: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexError {
    pub file: String,
    pub error: String,
}

/// Default output path: `index.json` in the parent of the manifest directory.
pub fn default_index_path(cw2_dir: &Path) -> PathBuf {
    cw2_dir
        .parent()
        .map(|p| p.join(INDEX_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(INDEX_FILE_NAME))
}

/// Build the index for `cw2_dir`, stamping it with `now`.
///
/// A missing directory yields an empty index. Unreadable documents and
/// documents lacking a required field are listed under `errors`.
pub fn generate_index(cw2_dir: &Path, now: DateTime<Utc>) -> Result<PluginIndex, SyncError> {
    let files = match scan_dir(cw2_dir) {
        Ok(files) => files,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(SyncError::malformed(
                cw2_dir.display().to_string(),
                format!("unreadable: {e}"),
            ));
        }
    };

    let mut plugins = Vec::new();
    let mut errors = Vec::new();
    for path in &files {
        match read_document(cw2_dir, path) {
            Ok(doc) => plugins.push(doc),
            Err(error) => errors.push(IndexError {
                file: path.display().to_string(),
                error,
            }),
        }
    }
    plugins.sort_by(|a, b| id_of(a).cmp(id_of(b)));

    let statistics = statistics(&plugins, errors.len());
    let manifest_directory = cw2_dir
        .canonicalize()
        .unwrap_or_else(|_| cw2_dir.to_path_buf());

    Ok(PluginIndex {
        metadata: IndexMetadata {
            generated_at: now.to_rfc3339(),
            manifest_directory: manifest_directory.display().to_string(),
            total_files_scanned: files.len(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        statistics,
        plugins,
        errors,
    })
}

/// Atomically write `index` to `output`.
pub fn write_index(index: &PluginIndex, output: &Path) -> Result<(), SyncError> {
    let mut bytes =
        serde_json::to_vec_pretty(index).map_err(|e| SyncError::persistence(output, e))?;
    bytes.push(b'\n');

    let (tmp, target) = stage(output, &bytes)?;
    tmp.persist(&target)
        .map_err(|e| SyncError::persistence(&target, e.error))?;

    info!(
        path = %output.display(),
        plugins = index.statistics.total_plugins,
        errors = index.statistics.total_errors,
        "plugin index written"
    );
    Ok(())
}

fn scan_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dirent in std::fs::read_dir(dir)? {
        let path = dirent?.path();
        if path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|n| n != CW2_TEMPLATE_FILE)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_document(dir: &Path, path: &Path) -> Result<Map<String, Value>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("File read error: {e}"))?;
    let mut doc = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(doc)) => doc,
        Ok(_) => return Err("Invalid JSON: top level must be an object".to_string()),
        Err(e) => return Err(format!("Invalid JSON: {e}")),
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !doc.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required fields: {}", missing.join(", ")));
    }

    let meta = std::fs::metadata(path).map_err(|e| format!("File read error: {e}"))?;
    let relative = path.strip_prefix(dir).unwrap_or(path);
    doc.insert("_file_path".into(), Value::from(relative.display().to_string()));
    doc.insert("_file_size".into(), Value::from(meta.len()));
    if let Ok(modified) = meta.modified() {
        let modified: DateTime<Utc> = modified.into();
        doc.insert("_modified_time".into(), Value::from(modified.to_rfc3339()));
    }
    Ok(doc)
}

fn id_of(doc: &Map<String, Value>) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn statistics(plugins: &[Map<String, Value>], total_errors: usize) -> IndexStatistics {
    let mut authors = BTreeSet::new();
    let mut versions = BTreeMap::new();
    let mut tags: HashMap<String, usize> = HashMap::new();

    for plugin in plugins {
        let author = plugin.get("author").and_then(Value::as_str).unwrap_or("Unknown");
        authors.insert(author.to_string());

        let version = match plugin.get("version") {
            Some(Value::String(v)) => v.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };
        *versions.entry(version).or_insert(0) += 1;

        let plugin_tags = plugin.get("tags").and_then(Value::as_array);
        for tag in plugin_tags.into_iter().flatten().filter_map(Value::as_str) {
            *tags.entry(tag.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = tags.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    IndexStatistics {
        total_plugins: plugins.len(),
        total_errors,
        unique_authors: authors.into_iter().collect(),
        version_distribution: versions,
        tag_distribution: ranked
            .into_iter()
            .map(|(tag, count)| (tag, Value::from(count)))
            .collect(),
    }
}
