// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colour management and other enumerated display controls.
//!
//! Every enumeration here has a wire encoding. Decoding goes through
//! `TryFrom<i32>` so out-of-range values surface as
//! [`Error::BadParameter`] at the boundary.

use crate::error::Error;

/// Display colour modes. Only [`ColorMode::Native`] is implemented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Whatever the panel does natively.
    #[default]
    Native,
    /// A recognized standard colour mode (wire values 1 to 12).
    Standard(u8),
}

impl ColorMode {
    const LAST: i32 = 12;

    /// Wire value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Native => 0,
            Self::Standard(value) => value as i32,
        }
    }
}

impl TryFrom<i32> for ColorMode {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            0 => Ok(Self::Native),
            1..=Self::LAST => u8::try_from(raw)
                .map(Self::Standard)
                .map_err(|_| Error::BadParameter),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Render intents. Only [`RenderIntent::Colorimetric`] is implemented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderIntent {
    /// Colours are reproduced exactly; out-of-gamut colours are clipped.
    #[default]
    Colorimetric,
    /// Colours are enhanced while staying in gamut.
    Enhance,
    /// HDR content is tone mapped, colorimetric otherwise.
    ToneMapColorimetric,
    /// HDR content is tone mapped, enhanced otherwise.
    ToneMapEnhance,
}

impl TryFrom<i32> for RenderIntent {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            0 => Ok(Self::Colorimetric),
            1 => Ok(Self::Enhance),
            2 => Ok(Self::ToneMapColorimetric),
            3 => Ok(Self::ToneMapEnhance),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Hint describing the colour transform the client wants applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorTransformHint {
    /// No transform.
    #[default]
    Identity,
    /// An arbitrary 4×4 matrix accompanies the hint.
    ArbitraryMatrix,
    /// Inverts colour values.
    ValueInverse,
    /// Desaturates to grayscale.
    Grayscale,
    /// Protanopia correction.
    CorrectProtanopia,
    /// Deuteranopia correction.
    CorrectDeuteranopia,
    /// Tritanopia correction.
    CorrectTritanopia,
}

impl TryFrom<i32> for ColorTransformHint {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            0 => Ok(Self::Identity),
            1 => Ok(Self::ArbitraryMatrix),
            2 => Ok(Self::ValueInverse),
            3 => Ok(Self::Grayscale),
            4 => Ok(Self::CorrectProtanopia),
            5 => Ok(Self::CorrectDeuteranopia),
            6 => Ok(Self::CorrectTritanopia),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Row-major 4×4 colour matrix.
pub type ColorMatrix = [f32; 16];

/// The identity colour matrix.
pub const IDENTITY_MATRIX: ColorMatrix = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Current colour transform of a display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTransform {
    /// Kind of transform.
    pub hint: ColorTransformHint,
    /// Matrix, meaningful for [`ColorTransformHint::ArbitraryMatrix`].
    pub matrix: ColorMatrix,
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self {
            hint: ColorTransformHint::Identity,
            matrix: IDENTITY_MATRIX,
        }
    }
}

/// Display power states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerMode {
    /// Powered down.
    Off,
    /// Low-power ambient display.
    Doze,
    /// Fully on.
    On,
    /// Ambient display without CPU updates.
    DozeSuspend,
}

impl TryFrom<i32> for PowerMode {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            0 => Ok(Self::Off),
            1 => Ok(Self::Doze),
            2 => Ok(Self::On),
            3 => Ok(Self::DozeSuspend),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Content type hints. Only [`ContentType::None`] is supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// No hint.
    #[default]
    None,
    /// Desktop or UI graphics.
    Graphics,
    /// Still photographs.
    Photo,
    /// Film or video.
    Cinema,
    /// Interactive games.
    Game,
}

impl TryFrom<i32> for ContentType {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Error> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::Graphics),
            2 => Ok(Self::Photo),
            3 => Ok(Self::Cinema),
            4 => Ok(Self::Game),
            _ => Err(Error::BadParameter),
        }
    }
}
