// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract with the display pipeline.
//!
//! The orchestrator decides *what* to show; a [`Pipeline`] knows *how*: it
//! describes its connector, owns the hardware planes, assigns composition
//! layers to planes, and applies commits atomically. Kernel mode-setting
//! drivers, test doubles, and remote displays all sit behind this trait.
//!
//! # Frame flow
//!
//! ```text
//!   Display::validate()
//!       │  Backend::classify()          (device / client split)
//!       │  Pipeline::plan_placement()   (test-only commit)
//!       │  Pipeline::commit(test_only)
//!       ▼
//!   Display::present()
//!       │  Pipeline::plan_placement()
//!       │  Pipeline::commit()  ──► present fence
//!       ▼
//!   Display::release_fences()
//! ```

use crate::commit::CommitRequest;
use crate::composition::{CompositionLayer, PlaneAssignment};
use crate::config::DisplayMode;
use crate::error::PipelineError;
use crate::fence::Fence;

/// How a connector is attached to the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    /// Built into the device (eDP, DSI, LVDS).
    Internal,
    /// User-pluggable (HDMI, DisplayPort).
    External,
    /// Writeback, virtual, or otherwise unclassified.
    #[default]
    Unknown,
}

/// Snapshot of a connector's state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorInfo {
    /// Connector object identifier.
    pub id: u32,
    /// Connector name, for example `HDMI-A-1`.
    pub name: String,
    /// Attachment kind.
    pub kind: ConnectorKind,
    /// Whether a sink is plugged in.
    pub connected: bool,
    /// Physical width in millimetres, zero when unknown.
    pub mm_width: u32,
    /// Physical height in millimetres, zero when unknown.
    pub mm_height: u32,
    /// Modes the sink supports, in connector order.
    pub modes: Vec<DisplayMode>,
    /// Raw EDID blob, if the sink provided one.
    pub edid: Option<Vec<u8>>,
}

/// Framebuffer size limits of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionLimits {
    /// Smallest supported `(width, height)`.
    pub min: (u32, u32),
    /// Largest supported `(width, height)`.
    pub max: (u32, u32),
}

impl ResolutionLimits {
    /// Returns `true` if `width` × `height` lies within the limits.
    #[must_use]
    pub fn contains(&self, width: u32, height: u32) -> bool {
        (self.min.0..=self.max.0).contains(&width) && (self.min.1..=self.max.1).contains(&height)
    }
}

impl Default for ResolutionLimits {
    fn default() -> Self {
        Self {
            min: (0, 0),
            max: (u32::MAX, u32::MAX),
        }
    }
}

/// Hardware plane identifier.
pub type PlaneId = u32;

/// Plane role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    /// Bottom-most plane; every composition needs one.
    Primary,
    /// Additional plane stacked above the primary.
    Overlay,
    /// Cursor plane, not used for general composition.
    Cursor,
}

/// A hardware plane usable by this display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Plane {
    /// Plane identifier.
    pub id: PlaneId,
    /// Plane role.
    pub kind: PlaneKind,
}

/// Planes offered to one placement request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AvailablePlanes {
    /// Primary planes, at least one required.
    pub primary: Vec<PlaneId>,
    /// Overlay planes, optional.
    pub overlay: Vec<PlaneId>,
}

impl AvailablePlanes {
    /// Splits a plane list by role. Cursor planes are left out.
    #[must_use]
    pub fn from_planes(planes: &[Plane]) -> Self {
        let mut available = Self::default();
        for plane in planes {
            match plane.kind {
                PlaneKind::Primary => available.primary.push(plane.id),
                PlaneKind::Overlay => available.overlay.push(plane.id),
                PlaneKind::Cursor => {}
            }
        }
        available
    }

    /// Total number of usable planes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary.len() + self.overlay.len()
    }

    /// Returns `true` if no plane is usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A scanout pipeline: connector, CRTC, and planes driven as one unit.
///
/// Shared between the client-facing thread and the display's vsync thread,
/// so implementations must be thread safe. Methods take `&self`.
pub trait Pipeline: Send + Sync {
    /// Re-reads the connector state and its modes.
    fn connector(&self) -> Result<ConnectorInfo, PipelineError>;

    /// Framebuffer size limits.
    fn resolution_limits(&self) -> ResolutionLimits {
        ResolutionLimits::default()
    }

    /// Planes this pipeline may use.
    fn planes(&self) -> Vec<Plane>;

    /// Assigns every composition layer to a plane.
    ///
    /// Layers arrive in ascending z. The bottom layer must land on a primary
    /// plane; the rest use overlays.
    fn plan_placement(
        &self,
        layers: &[CompositionLayer],
        planes: &AvailablePlanes,
    ) -> Result<Vec<PlaneAssignment>, PipelineError>;

    /// Applies a commit atomically. Test-only commits must not change any
    /// hardware state.
    ///
    /// Returns the present fence of a real commit that scanned out a new
    /// composition.
    fn commit(&self, request: CommitRequest) -> Result<Option<Fence>, PipelineError>;

    /// Powers the display on through the legacy power-control path, without
    /// a composition.
    fn activate_legacy(&self) -> Result<(), PipelineError>;

    /// Blocks until the next hardware vblank and returns its timestamp in
    /// monotonic nanoseconds.
    ///
    /// `Ok(None)` (the default) means the pipeline has no vblank events and
    /// the caller should synthesize them.
    fn wait_vblank(&self) -> Result<Option<i64>, PipelineError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_split_by_role() {
        let planes = [
            Plane {
                id: 31,
                kind: PlaneKind::Primary,
            },
            Plane {
                id: 40,
                kind: PlaneKind::Overlay,
            },
            Plane {
                id: 41,
                kind: PlaneKind::Cursor,
            },
            Plane {
                id: 42,
                kind: PlaneKind::Overlay,
            },
        ];
        let available = AvailablePlanes::from_planes(&planes);
        assert_eq!(available.primary, vec![31]);
        assert_eq!(available.overlay, vec![40, 42]);
        assert_eq!(available.len(), 3);
    }

    #[test]
    fn resolution_limits_are_inclusive() {
        let limits = ResolutionLimits {
            min: (64, 64),
            max: (4096, 4096),
        };
        assert!(limits.contains(64, 4096));
        assert!(!limits.contains(63, 100));
        assert!(!limits.contains(100, 4097));
    }
}
