// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the scheduler and its collaborators.
//!
//! The scheduler talks to the network only through [`ManifestSource`] and
//! reads the date only through [`Clock`], so both can be replaced in tests.

pub mod clock;
pub mod source;

pub use clock::{Clock, SystemClock};
pub use source::ManifestSource;
