// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition: the ordered set of layers scanned out for one frame.

use kurbo::Rect;

use crate::buffer::BufferInfo;
use crate::fence::Fence;
use crate::geometry::Frame;
use crate::layer::{BlendMode, ColorSpace, LayerId, LayerTransform, SampleRange};
use crate::pipeline::PlaneId;

/// Where a composition layer's content comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerSource {
    /// A device-composited client layer.
    Layer(LayerId),
    /// The client target, standing in for every client-composited layer.
    ClientTarget,
}

/// One entry of a [`Composition`], with its buffer already imported.
#[derive(Debug)]
pub struct CompositionLayer {
    /// Originating layer.
    pub source: LayerSource,
    /// Stacking position.
    pub z_order: u32,
    /// Imported buffer metadata.
    pub buffer: BufferInfo,
    /// Fence to wait on before scanning out the buffer.
    pub acquire_fence: Option<Fence>,
    /// Source crop in buffer coordinates.
    pub source_crop: Rect,
    /// Destination on the output.
    pub display_frame: Frame,
    /// Plane alpha, `0` transparent to `u16::MAX` opaque.
    pub alpha: u16,
    /// Blend mode.
    pub blend: BlendMode,
    /// Scanout transform.
    pub transform: LayerTransform,
    /// Colour standard.
    pub color_space: ColorSpace,
    /// Sample range.
    pub sample_range: SampleRange,
}

/// Maps a composition layer (by index) to a hardware plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneAssignment {
    /// Index into [`Composition::layers`].
    pub layer: usize,
    /// Plane the layer is placed on.
    pub plane: PlaneId,
}

/// Layers to realize in one commit, in ascending z.
///
/// Built fresh for every commit and moved into it; nothing keeps a
/// reference afterwards.
#[derive(Debug, Default)]
pub struct Composition {
    /// Layers in ascending z.
    pub layers: Vec<CompositionLayer>,
    /// Plane placement, filled once planning succeeds.
    pub planes: Vec<PlaneAssignment>,
}

impl Composition {
    /// Creates a composition over already ordered layers.
    #[must_use]
    pub fn new(layers: Vec<CompositionLayer>) -> Self {
        Self {
            layers,
            planes: Vec::new(),
        }
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Identifiers of the device-composited layers it contains.
    pub fn device_layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().filter_map(|l| match l.source {
            LayerSource::Layer(id) => Some(id),
            LayerSource::ClientTarget => None,
        })
    }
}
