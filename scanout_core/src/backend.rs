// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device/client split strategies.
//!
//! A [`Backend`] decides, for the z-ordered layers of one display, which
//! ones go to hardware planes and which ones the client has to render into
//! the client target. It is picked once per display when the display is
//! created.
//!
//! The split is always *contiguous*: client-composited layers form one
//! z-range, because the client target occupies a single plane at a single
//! z position. [`GenericBackend`] is the default strategy.

use crate::buffer::BufferImporter;
use crate::color::ColorTransformHint;
use crate::layer::{CompositionType, Layer};

/// Outcome of classification for one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Scanned out on its own plane.
    Device,
    /// Rendered by the client into the client target.
    Client,
}

impl Placement {
    /// Composition type to report back to the client.
    #[must_use]
    pub const fn composition_type(self) -> CompositionType {
        match self {
            Self::Device => CompositionType::Device,
            Self::Client => CompositionType::Client,
        }
    }
}

/// Display state a backend may consult.
#[derive(Clone, Copy)]
pub struct ClassifyContext<'a> {
    /// Primary plus overlay planes the display may use.
    pub available_planes: usize,
    /// Current colour transform of the display.
    pub color_transform: ColorTransformHint,
    /// Importer, to probe whether a buffer can be scanned out.
    pub importer: &'a dyn BufferImporter,
}

impl core::fmt::Debug for ClassifyContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClassifyContext")
            .field("available_planes", &self.available_planes)
            .field("color_transform", &self.color_transform)
            .finish_non_exhaustive()
    }
}

/// Device/client split strategy.
pub trait Backend: Send {
    /// Classifies `layers`, given in ascending z.
    ///
    /// Returns one [`Placement`] per input layer, in the same order.
    fn classify(&self, layers: &[&Layer], ctx: &ClassifyContext<'_>) -> Vec<Placement>;
}

/// Contiguous client range, as `start..start + len` over z-ordered layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClientRange {
    /// First client-composited position.
    pub start: usize,
    /// Number of client-composited layers.
    pub len: usize,
}

impl ClientRange {
    /// Returns `true` if position `z` is client composited.
    #[must_use]
    pub fn contains(&self, z: usize) -> bool {
        z >= self.start && z < self.start + self.len
    }

    /// Expands the range into per-layer placements.
    #[must_use]
    pub fn placements(&self, count: usize) -> Vec<Placement> {
        (0..count)
            .map(|z| {
                if self.contains(z) {
                    Placement::Client
                } else {
                    Placement::Device
                }
            })
            .collect()
    }
}

/// Sum of display-frame areas of `layers[range]`, saturating at `u64::MAX`.
#[must_use]
pub fn pixel_ops(layers: &[&Layer], range: ClientRange) -> u64 {
    layers
        .iter()
        .enumerate()
        .filter(|(z, _)| range.contains(*z))
        .map(|(_, layer)| layer.display_frame().area())
        .fold(0, u64::saturating_add)
}

/// Default split: everything hardware cannot take, plus the cheapest extra
/// layers when there are more layers than planes.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericBackend;

impl GenericBackend {
    /// Returns `true` if `layer` cannot be scanned out as is.
    fn is_client_layer(layer: &Layer, ctx: &ClassifyContext<'_>) -> bool {
        let supported_type = matches!(
            layer.requested_type(),
            CompositionType::Device | CompositionType::Cursor
        );
        let usable_buffer = layer
            .buffer()
            .is_some_and(|handle| ctx.importer.is_usable(handle));
        !supported_type || !usable_buffer || ctx.color_transform != ColorTransformHint::Identity
    }

    /// Smallest contiguous range covering every layer that must be client
    /// composited.
    fn required_range(layers: &[&Layer], ctx: &ClassifyContext<'_>) -> ClientRange {
        let mut start = None;
        let mut len = 0;
        for (z, layer) in layers.iter().enumerate() {
            if Self::is_client_layer(layer, ctx) {
                let first = *start.get_or_insert(z);
                len = z - first + 1;
            }
        }
        ClientRange {
            start: start.unwrap_or(0),
            len,
        }
    }

    /// Widens `range` until the remaining device layers fit the planes,
    /// choosing the placement that leaves the fewest pixels to the client.
    fn extend_range(layers: &[&Layer], available_planes: usize, range: ClientRange) -> ClientRange {
        let total = layers.len();
        // One plane goes to the client target when not every layer fits.
        let planes = if available_planes < total {
            available_planes.saturating_sub(1)
        } else {
            available_planes
        };
        let device = total - range.len;
        if device <= planes {
            return range;
        }
        let extra = device - planes;

        let (first, len, steps) = if range.len == 0 {
            (0, extra, total - extra + 1)
        } else {
            let prepend = range.start.min(extra);
            let append = (total - (range.start + range.len)).min(extra);
            let first = range.start - prepend;
            let len = range.len + extra;
            let room = total.saturating_sub(first + len);
            (first, len, 1 + append.min(prepend).min(room))
        };

        let mut best = ClientRange { start: first, len };
        let mut best_ops = u64::MAX;
        for step in 0..steps {
            let candidate = ClientRange {
                start: first + step,
                len,
            };
            let ops = pixel_ops(layers, candidate);
            if ops < best_ops {
                best_ops = ops;
                best = candidate;
            }
        }
        best
    }

    /// Computes the client range for `layers`.
    #[must_use]
    pub fn client_range(layers: &[&Layer], ctx: &ClassifyContext<'_>) -> ClientRange {
        let required = Self::required_range(layers, ctx);
        Self::extend_range(layers, ctx.available_planes, required)
    }
}

impl Backend for GenericBackend {
    fn classify(&self, layers: &[&Layer], ctx: &ClassifyContext<'_>) -> Vec<Placement> {
        Self::client_range(layers, ctx).placements(layers.len())
    }
}
