// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic clock reads.
//!
//! Vsync timestamps handed to the client are `CLOCK_MONOTONIC` nanoseconds,
//! matching what the kernel reports for hardware vblank events.

use rustix::time::{ClockId, Timespec, clock_gettime};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Returns the current `CLOCK_MONOTONIC` time in nanoseconds.
#[must_use]
pub fn monotonic_ns() -> i64 {
    timespec_to_nanos(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_nanos(timespec: Timespec) -> i64 {
    let nanos = i128::from(timespec.tv_sec)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(i128::from(timespec.tv_nsec).clamp(0, NANOS_PER_SECOND - 1));
    i64::try_from(nanos).unwrap_or(i64::MAX)
}

/// Returns the first vsync boundary strictly after `now`, phase-aligned to
/// `last` when a previous vsync is known.
#[must_use]
pub(crate) fn next_phased_vsync(period_ns: i64, now: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if period_ns > 0 => period_ns * ((now - last) / period_ns + 1) + last,
        _ => now + period_ns,
    }
}
