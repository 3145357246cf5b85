// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer display rectangles.
//!
//! Display frames are expressed in whole pixels on the output, while source
//! crops are fractional and use [`kurbo::Rect`] directly.

use kurbo::Rect;

/// An integer rectangle in output pixel coordinates.
///
/// Edges are exclusive on the right and bottom. A frame whose right edge is
/// left of its left edge (or bottom above top) is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Frame {
    /// Creates a frame from its four edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a frame anchored at the origin covering `width` × `height`.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Width in pixels, zero when the frame is inverted.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u64 {
        u64::try_from(i64::from(self.right) - i64::from(self.left)).unwrap_or(0)
    }

    /// Height in pixels, zero when the frame is inverted.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u64 {
        u64::try_from(i64::from(self.bottom) - i64::from(self.top)).unwrap_or(0)
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub fn area(&self) -> u64 {
        self.width() * self.height()
    }

    /// Converts to a floating-point rectangle.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}
