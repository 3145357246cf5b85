// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable display dumps.

use core::fmt::{self, Write};

use scanout_core::flattening::FlatteningState;
use scanout_core::report::DisplayReport;
use scanout_core::stats::Stats;

/// Header preceding the per-display sections of a full dump.
pub const DUMP_HEADER: &str = "-- scanout --\n\n";

/// Describes a flattening state.
#[must_use]
pub fn flattening_state_name(state: FlatteningState) -> String {
    match state {
        FlatteningState::Disabled => "Disabled".to_owned(),
        FlatteningState::NotRequired => "Not needed".to_owned(),
        FlatteningState::Flattened => "Active".to_owned(),
        FlatteningState::ClientRefreshRequested => "Refresh requested".to_owned(),
        FlatteningState::Countdown(remaining) => format!("{remaining} VSync remains"),
    }
}

fn write_stats<W: Write>(w: &mut W, stats: &Stats) -> fmt::Result {
    let Some(efficiency) = stats.composition_efficiency() else {
        return w.write_str("No stats yet");
    };
    writeln!(w, " Total frames count: {}", stats.total_frames)?;
    writeln!(w, " Failed to test commit frames: {}", stats.failed_kms_validate)?;
    writeln!(w, " Failed to commit frames: {}", stats.failed_kms_present)?;
    if stats.failed_kms_present > 0 {
        writeln!(w, " !!! Internal failure, FIX it please")?;
    }
    writeln!(w, " Flattened frames: {}", stats.frames_flattened)?;
    writeln!(
        w,
        " Pixel operations (free units) : [TOTAL: {} / GPU: {}]",
        stats.total_pixops, stats.gpu_pixops,
    )?;
    write!(w, " Composition efficiency: {efficiency}")
}

/// Writes the dump of one display.
pub fn write_report<W: Write>(w: &mut W, report: &DisplayReport) -> fmt::Result {
    writeln!(w, "- Display on: {}", report.connector)?;
    writeln!(
        w,
        "  Flattening state: {}",
        flattening_state_name(report.flattening),
    )?;
    writeln!(w, "Statistics since system boot:")?;
    write_stats(w, &report.totals)?;
    w.write_str("\n\n")?;
    writeln!(w, "Statistics since last dumpsys request:")?;
    write_stats(w, &report.delta)?;
    w.write_str("\n\n")
}

/// Renders a full dump of every display.
#[must_use]
pub fn dump_to_string(reports: &[DisplayReport]) -> String {
    let mut out = String::from(DUMP_HEADER);
    for report in reports {
        // Writing into a String cannot fail.
        let _ = write_report(&mut out, report);
    }
    out
}
