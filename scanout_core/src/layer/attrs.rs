// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer attribute types and their wire encodings.

use tracing::error;

use crate::error::Error;

/// How a layer's pixels combine with the content beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Opaque; alpha is ignored.
    #[default]
    None,
    /// Colour channels are already multiplied by alpha.
    Premultiplied,
    /// Colour channels are multiplied by alpha during blending.
    Coverage,
}

impl BlendMode {
    /// Decodes a wire value, falling back to [`BlendMode::None`] for unknown
    /// values.
    #[must_use]
    pub fn from_raw_lossy(raw: i32) -> Self {
        match raw {
            1 => Self::None,
            2 => Self::Premultiplied,
            3 => Self::Coverage,
            _ => {
                error!(blend = raw, "unknown blend mode, using none");
                Self::None
            }
        }
    }
}

/// How the client asked a layer to be composited, and how validation
/// decided it will be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompositionType {
    /// Rendered by the client into the client target.
    #[default]
    Client,
    /// Scanned out directly on a plane.
    Device,
    /// A constant colour fill.
    SolidColor,
    /// A cursor plane.
    Cursor,
    /// A sideband video stream.
    Sideband,
}

impl CompositionType {
    /// Wire value of this type.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Client => 1,
            Self::Device => 2,
            Self::SolidColor => 3,
            Self::Cursor => 4,
            Self::Sideband => 5,
        }
    }
}

impl TryFrom<i32> for CompositionType {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            1 => Ok(Self::Client),
            2 => Ok(Self::Device),
            3 => Ok(Self::SolidColor),
            4 => Ok(Self::Cursor),
            5 => Ok(Self::Sideband),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Colour primaries and transfer, as far as scanout cares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Not specified.
    #[default]
    Undefined,
    /// ITU-R BT.601.
    Bt601,
    /// ITU-R BT.709.
    Bt709,
    /// ITU-R BT.2020.
    Bt2020,
}

/// YUV sample quantization range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleRange {
    /// Not specified.
    #[default]
    Undefined,
    /// Full range (0–255 for 8-bit samples).
    Full,
    /// Limited range (16–235 for 8-bit luma).
    Limited,
}

/// Packed dataspace descriptor as sent by the client.
///
/// Only the standard and range fields are decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dataspace(pub i32);

impl Dataspace {
    /// The "unknown" dataspace.
    pub const UNKNOWN: Self = Self(0);

    const STANDARD_SHIFT: u32 = 16;
    const STANDARD_MASK: i32 = 63 << Self::STANDARD_SHIFT;
    const RANGE_SHIFT: u32 = 27;
    const RANGE_MASK: i32 = 7 << Self::RANGE_SHIFT;

    /// Decodes the colour standard.
    #[must_use]
    pub const fn color_space(self) -> ColorSpace {
        match (self.0 & Self::STANDARD_MASK) >> Self::STANDARD_SHIFT {
            1 => ColorSpace::Bt709,
            // 625 and 525 line variants, adjusted or not.
            2..=5 => ColorSpace::Bt601,
            // Constant luminance included.
            6 | 7 => ColorSpace::Bt2020,
            _ => ColorSpace::Undefined,
        }
    }

    /// Decodes the sample range.
    #[must_use]
    pub const fn sample_range(self) -> SampleRange {
        match (self.0 & Self::RANGE_MASK) >> Self::RANGE_SHIFT {
            1 => SampleRange::Full,
            2 => SampleRange::Limited,
            _ => SampleRange::Undefined,
        }
    }
}

/// An RGBA8 fill colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}
