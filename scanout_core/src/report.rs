// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic snapshot of one display.

use serde::Serialize;

use crate::flattening::FlatteningState;
use crate::output::DisplayHandle;
use crate::stats::Stats;

/// What a diagnostics dump shows for one display.
///
/// Producing a report starts a new statistics window, so `delta` covers the
/// time since the previous report of the same display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayReport {
    /// Display handle.
    pub handle: DisplayHandle,
    /// Connector name, or `NULL-DISPLAY` while headless.
    pub connector: String,
    /// Flattening state at the time of the report.
    pub flattening: FlatteningState,
    /// Counters since the display was created.
    pub totals: Stats,
    /// Counters since the previous report.
    pub delta: Stats,
}
