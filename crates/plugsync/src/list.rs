// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `plugsync list` command implementation.

use plugsync_config::PlugsyncConfig;
use plugsync_core::{PluginEntry, PluginFormat};
use plugsync_registry::RegistryBackend;
use serde::Serialize;

use crate::error::CliError;
use crate::serve::file_store;

/// One row of `--json` output.
#[derive(Debug, Serialize)]
pub struct ListItem<'a> {
    pub id: &'a str,
    pub format: PluginFormat,
    pub name: &'a str,
    pub version: &'a str,
    pub update_date: Option<&'a str>,
    pub author: &'a str,
    pub url: &'a str,
    pub branch: &'a str,
    pub tags: &'a [String],
}

impl<'a> From<&'a PluginEntry> for ListItem<'a> {
    fn from(entry: &'a PluginEntry) -> Self {
        Self {
            id: &entry.id,
            format: entry.format(),
            name: &entry.name,
            version: &entry.version,
            update_date: entry.update_date.as_deref(),
            author: &entry.author,
            url: &entry.source_url,
            branch: &entry.branch,
            tags: &entry.tags,
        }
    }
}

/// Runs the `plugsync list` command.
pub fn run_list(
    config: &PlugsyncConfig,
    json: bool,
    format: Option<PluginFormat>,
    search: Option<&str>,
) -> Result<(), CliError> {
    let registry = file_store(config).load()?;

    let entries = match search {
        Some(query) => registry.search(query),
        None => registry.list(),
    };
    let items: Vec<ListItem<'_>> = entries
        .into_iter()
        .filter(|e| format.is_none_or(|f| e.format() == f))
        .map(ListItem::from)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!(
            "{:<32} {:<7} {:<12} {:<11} {}",
            item.id,
            item.format.to_string(),
            item.version,
            item.update_date.unwrap_or("-"),
            item.name
        );
    }
    println!("{} plugin(s)", items.len());
    Ok(())
}
