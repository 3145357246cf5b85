// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics output for scanout displays.
//!
//! Both renderings consume the [`DisplayReport`](scanout_core::report::DisplayReport)s
//! returned by [`Composer::dump`](scanout_core::composer::Composer::dump):
//!
//! - [`pretty::write_report`] writes the human-readable dump.
//! - [`json::report_to_json`] exports the same data as JSON.

pub mod json;
pub mod pretty;
