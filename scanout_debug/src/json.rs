// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of display reports.

use scanout_core::report::DisplayReport;
use serde_json::{Value, json};

use crate::pretty::flattening_state_name;

/// Converts a report to a JSON value.
///
/// The flattening state is exported both structurally and as its dump name.
/// The composition efficiency is `null` until pixel operations were counted.
#[must_use]
pub fn report_to_value(report: &DisplayReport) -> Value {
    json!({
        "handle": report.handle,
        "connector": report.connector,
        "flattening": report.flattening,
        "flattening_name": flattening_state_name(report.flattening),
        "totals": report.totals,
        "delta": report.delta,
        "efficiency": {
            "totals": report.totals.composition_efficiency(),
            "delta": report.delta.composition_efficiency(),
        },
    })
}

/// Serializes a report to a JSON string.
pub fn report_to_json(report: &DisplayReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&report_to_value(report))
}

/// Serializes a full dump to a JSON array.
pub fn dump_to_json(reports: &[DisplayReport]) -> serde_json::Result<String> {
    let values: Vec<Value> = reports.iter().map(report_to_value).collect();
    serde_json::to_string_pretty(&values)
}
