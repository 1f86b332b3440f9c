// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for Plugsync.
//!
//! Holds the in-memory table of plugin entries, the file stores for the
//! legacy and CW2 conventions, the field rules checked on load, and the CW2
//! index generator.

pub mod document;
pub mod index;
pub mod registry;
pub mod rules;
pub mod store;

pub use index::{PluginIndex, default_index_path, generate_index, write_index};
pub use registry::Registry;
pub use store::{FileStore, RegistryBackend, StoreIssue};
