// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame statistics.

use serde::Serialize;

/// Per-display counters.
///
/// All counters only grow. Pixel operations are display-frame areas summed
/// over layers; `gpu_pixops` counts the part the client had to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Stats {
    /// Presents attempted.
    pub total_frames: u64,
    /// Pixel operations over all validated layers.
    pub total_pixops: u64,
    /// Pixel operations over client-composited layers.
    pub gpu_pixops: u64,
    /// Test-only commits rejected during validation.
    pub failed_kms_validate: u64,
    /// Real commits that failed during present.
    pub failed_kms_present: u64,
    /// Frames composed entirely by the client because of flattening.
    pub frames_flattened: u64,
}

impl Stats {
    /// Adds one validation's pixel operations, saturating at `u64::MAX`.
    pub fn record_pixel_ops(&mut self, gpu: u64, total: u64) {
        self.gpu_pixops = self.gpu_pixops.saturating_add(gpu);
        self.total_pixops = self.total_pixops.saturating_add(total);
    }

    /// Field-wise `self - earlier`, saturating at zero.
    #[must_use]
    pub fn minus(&self, earlier: &Self) -> Self {
        Self {
            total_frames: self.total_frames.saturating_sub(earlier.total_frames),
            total_pixops: self.total_pixops.saturating_sub(earlier.total_pixops),
            gpu_pixops: self.gpu_pixops.saturating_sub(earlier.gpu_pixops),
            failed_kms_validate: self
                .failed_kms_validate
                .saturating_sub(earlier.failed_kms_validate),
            failed_kms_present: self
                .failed_kms_present
                .saturating_sub(earlier.failed_kms_present),
            frames_flattened: self.frames_flattened.saturating_sub(earlier.frames_flattened),
        }
    }

    /// Share of pixel operations handled by scanout hardware, `None` before
    /// any frame was validated.
    #[must_use]
    pub fn composition_efficiency(&self) -> Option<f64> {
        if self.total_pixops == 0 {
            return None;
        }
        Some(1.0 - self.gpu_pixops as f64 / self.total_pixops as f64)
    }
}

/// Lifetime counters plus the snapshot taken at the last delta read.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsTracker {
    total: Stats,
    previous: Stats,
}

impl StatsTracker {
    /// Creates a tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime counters.
    #[must_use]
    pub fn total(&self) -> &Stats {
        &self.total
    }

    /// Lifetime counters, for updating.
    pub fn total_mut(&mut self) -> &mut Stats {
        &mut self.total
    }

    /// Returns the counters accumulated since the previous call and starts a
    /// new window. Lifetime totals are untouched.
    pub fn take_delta(&mut self) -> Stats {
        let delta = self.total.minus(&self.previous);
        self.previous = self.total;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_read_is_destructive_for_window_only() {
        let mut tracker = StatsTracker::new();
        tracker.total_mut().total_frames = 5;
        tracker.total_mut().failed_kms_present = 2;

        let delta = tracker.take_delta();
        assert_eq!(delta.total_frames, 5);
        assert_eq!(delta.failed_kms_present, 2);

        assert_eq!(tracker.take_delta(), Stats::default());
        assert_eq!(tracker.total().total_frames, 5);

        tracker.total_mut().total_frames += 1;
        assert_eq!(tracker.take_delta().total_frames, 1);
    }

    #[test]
    fn efficiency_needs_pixel_ops() {
        let mut stats = Stats::default();
        assert_eq!(stats.composition_efficiency(), None);
        stats.total_pixops = 400;
        stats.gpu_pixops = 100;
        assert_eq!(stats.composition_efficiency(), Some(0.75));
    }

    #[test]
    fn pixel_ops_saturate() {
        let mut stats = Stats::default();
        stats.record_pixel_ops(u64::MAX - 1, u64::MAX - 1);
        stats.record_pixel_ops(10, 10);
        assert_eq!(stats.gpu_pixops, u64::MAX, "gpu saturates");
        assert_eq!(stats.total_pixops, u64::MAX, "total saturates");
    }
}
