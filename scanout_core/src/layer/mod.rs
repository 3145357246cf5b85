// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client layers and their storage.
//!
//! A [`Layer`] carries everything the client says about one compositable
//! buffer: geometry, blending, z-order, and the composition type it would
//! like. Validation writes back the type it will actually get; the two are
//! reconciled by `accept_changes` on the display.
//!
//! Layers live in a [`LayerStore`], which issues identifiers and tracks
//! whether anything changed since the last validation.

mod attrs;
mod id;
mod store;
mod transform;

pub use attrs::{BlendMode, Color, ColorSpace, CompositionType, Dataspace, SampleRange};
pub use id::LayerId;
pub use store::LayerStore;
pub use transform::LayerTransform;

use kurbo::Rect;

use crate::buffer::BufferHandle;
use crate::error::{Error, Result};
use crate::fence::Fence;
use crate::geometry::Frame;

/// A client-visible compositable unit.
#[derive(Debug, Default)]
pub struct Layer {
    z_order: u32,
    buffer: Option<BufferHandle>,
    acquire_fence: Option<Fence>,
    release_fence: Option<Fence>,
    source_crop: Rect,
    display_frame: Frame,
    blend: BlendMode,
    dataspace: Dataspace,
    alpha: f32,
    transform: LayerTransform,
    requested: CompositionType,
    validated: CompositionType,
    type_changed: bool,
}

impl Layer {
    /// Creates a layer with default attributes: no buffer, z 0, opaque
    /// blending, full plane alpha, client composition requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            ..Self::default()
        }
    }

    // -- Client setters --

    /// Attaches a buffer and its acquire fence, replacing any previous one.
    pub fn set_buffer(&mut self, buffer: Option<BufferHandle>, acquire_fence: Option<Fence>) {
        self.buffer = buffer;
        self.acquire_fence = acquire_fence;
    }

    /// Sets the source crop in buffer coordinates.
    pub fn set_source_crop(&mut self, crop: Rect) {
        self.source_crop = crop;
    }

    /// Sets the destination rectangle on the output.
    pub fn set_display_frame(&mut self, frame: Frame) {
        self.display_frame = frame;
    }

    /// Sets the stacking position. Higher values are nearer the viewer.
    pub fn set_z_order(&mut self, z_order: u32) {
        self.z_order = z_order;
    }

    /// Sets the blend mode.
    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// Sets the dataspace.
    pub fn set_dataspace(&mut self, dataspace: Dataspace) {
        self.dataspace = dataspace;
    }

    /// Sets the plane alpha in `0.0..=1.0`. Out-of-range values are clamped.
    pub fn set_plane_alpha(&mut self, alpha: f32) {
        self.alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
    }

    /// Sets the scanout transform.
    pub fn set_transform(&mut self, transform: LayerTransform) {
        self.transform = transform;
    }

    /// Records the composition type the client would like. Clears any
    /// change reported by the last validation.
    pub fn set_composition_type(&mut self, requested: CompositionType) {
        self.requested = requested;
        self.type_changed = false;
    }

    /// Accepted and ignored; cursor planes are positioned through the
    /// display frame.
    pub fn set_cursor_position(&mut self, _x: i32, _y: i32) {}

    /// Accepted and ignored.
    pub fn set_surface_damage(&mut self, _damage: &[Frame]) {}

    /// Accepted and ignored.
    pub fn set_visible_region(&mut self, _visible: &[Frame]) {}

    /// Accepted and ignored; solid-colour layers fall back to the client.
    pub fn set_color(&mut self, _color: Color) {}

    /// Sideband streams cannot be scanned out.
    pub fn set_sideband_stream(&mut self, _stream: u64) -> Result<()> {
        Err(Error::Unsupported)
    }

    // -- Accessors --

    /// Stacking position.
    #[must_use]
    pub fn z_order(&self) -> u32 {
        self.z_order
    }

    /// Attached buffer, if any.
    #[must_use]
    pub fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    /// Acquire fence of the attached buffer, if any.
    #[must_use]
    pub fn acquire_fence(&self) -> Option<&Fence> {
        self.acquire_fence.as_ref()
    }

    /// Source crop in buffer coordinates.
    #[must_use]
    pub fn source_crop(&self) -> Rect {
        self.source_crop
    }

    /// Destination rectangle on the output.
    #[must_use]
    pub fn display_frame(&self) -> Frame {
        self.display_frame
    }

    /// Blend mode.
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Dataspace as sent by the client.
    #[must_use]
    pub fn dataspace(&self) -> Dataspace {
        self.dataspace
    }

    /// Plane alpha in `0.0..=1.0`.
    #[must_use]
    pub fn plane_alpha(&self) -> f32 {
        self.alpha
    }

    /// Plane alpha scaled to the 16-bit range used by scanout hardware.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "alpha is clamped to 0..=1, so the scaled value fits in u16"
    )]
    pub fn plane_alpha_u16(&self) -> u16 {
        (65535.0 * self.alpha).round() as u16
    }

    /// Scanout transform.
    #[must_use]
    pub fn transform(&self) -> LayerTransform {
        self.transform
    }

    /// Composition type the client asked for.
    #[must_use]
    pub fn requested_type(&self) -> CompositionType {
        self.requested
    }

    /// Composition type decided by the last validation.
    ///
    /// Only meaningful until the next mutation of the layer set.
    #[must_use]
    pub fn validated_type(&self) -> CompositionType {
        self.validated
    }

    /// Returns `true` if the last validation decided a type other than the
    /// requested one, and neither the client nor `accept_changes` has
    /// settled it since.
    #[must_use]
    pub fn type_changed(&self) -> bool {
        self.type_changed
    }

    // -- Orchestrator-side state --

    pub(crate) fn set_validated_type(&mut self, validated: CompositionType) {
        self.validated = validated;
        self.type_changed = self.requested != validated;
    }

    pub(crate) fn accept_type_change(&mut self) {
        if self.type_changed {
            self.requested = self.validated;
            self.type_changed = false;
        }
    }

    /// Duplicates the acquire fence, leaving the layer's copy in place.
    pub(crate) fn dup_acquire_fence(&self) -> Option<Fence> {
        self.acquire_fence.as_ref().map(Fence::dup)
    }

    /// Moves the acquire fence out of the layer.
    pub(crate) fn take_acquire_fence(&mut self) -> Option<Fence> {
        self.acquire_fence.take()
    }

    pub(crate) fn set_release_fence(&mut self, fence: Fence) {
        self.release_fence = Some(fence);
    }

    /// Moves the release fence out, leaving the slot empty.
    pub(crate) fn take_release_fence(&mut self) -> Option<Fence> {
        self.release_fence.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_layer_defaults() {
        let layer = Layer::new();
        assert_eq!(layer.z_order(), 0);
        assert_eq!(layer.buffer(), None);
        assert_eq!(layer.plane_alpha(), 1.0);
        assert_eq!(layer.plane_alpha_u16(), u16::MAX);
        assert_eq!(layer.requested_type(), CompositionType::Client);
        assert!(!layer.type_changed());
    }

    #[test]
    fn plane_alpha_is_clamped_and_scaled() {
        let mut layer = Layer::new();
        layer.set_plane_alpha(0.5);
        assert_eq!(layer.plane_alpha_u16(), 32768);
        layer.set_plane_alpha(-3.0);
        assert_eq!(layer.plane_alpha_u16(), 0);
        layer.set_plane_alpha(7.0);
        assert_eq!(layer.plane_alpha_u16(), u16::MAX);
    }

    #[test]
    fn accepting_changes_adopts_validated_type() {
        let mut layer = Layer::new();
        layer.set_composition_type(CompositionType::Device);
        layer.set_validated_type(CompositionType::Client);
        assert!(layer.type_changed());
        layer.accept_type_change();
        assert_eq!(layer.requested_type(), CompositionType::Client);
        assert!(!layer.type_changed());
    }

    #[test]
    fn type_change_is_recorded_by_validation_only() {
        let mut layer = Layer::new();
        layer.set_composition_type(CompositionType::Device);
        assert!(!layer.type_changed(), "not validated yet");

        layer.set_validated_type(CompositionType::Client);
        assert!(layer.type_changed(), "validation demoted the layer");

        layer.set_composition_type(CompositionType::Cursor);
        assert!(!layer.type_changed(), "new request supersedes the change");

        layer.set_validated_type(CompositionType::Cursor);
        assert!(!layer.type_changed(), "validation kept the request");
    }

    #[test]
    fn release_fence_is_handed_out_once() {
        let mut layer = Layer::new();
        layer.set_release_fence(Fence::from_raw(9));
        assert_eq!(layer.take_release_fence().map(Fence::into_raw), Some(9));
        assert!(layer.take_release_fence().is_none());
    }

    #[test]
    fn sideband_is_unsupported() {
        let mut layer = Layer::new();
        assert_eq!(layer.set_sideband_stream(1), Err(Error::Unsupported));
    }
}
