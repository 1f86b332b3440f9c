// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Plugsync integration tests.
//!
//! Provides mock adapters and registry fixtures for fast, deterministic,
//! CI-runnable tests without network access.
//!
//! # Components
//!
//! - [`MockSource`] - Mock manifest source with canned per-repository responses
//! - [`MemoryBackend`] - In-memory registry backend counting persists
//! - [`TempStore`] - File store rooted in a temp directory

pub mod harness;
pub mod mock_source;

pub use harness::{
    FixedClock, MemoryBackend, TempStore, cw2_entry, legacy_entry, registry_of, repo_url,
};
pub use mock_source::{MockResponse, MockSource, error_for};
