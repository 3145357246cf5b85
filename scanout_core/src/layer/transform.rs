// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plane-level flips and rotations.

use core::fmt;

/// A combination of flips and a quarter-turn rotation applied at scanout.
///
/// Stored as a small bit set. The client encoding expresses 180° and 270°
/// as combinations of flips and a 90° rotation; [`LayerTransform::from_raw`]
/// canonicalises those into single rotation bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayerTransform(u8);

impl LayerTransform {
    /// No transform.
    pub const IDENTITY: Self = Self(0);
    /// Horizontal flip.
    pub const FLIP_H: Self = Self(1 << 0);
    /// Vertical flip.
    pub const FLIP_V: Self = Self(1 << 1);
    /// 90° clockwise rotation.
    pub const ROTATE_90: Self = Self(1 << 2);
    /// 180° rotation.
    pub const ROTATE_180: Self = Self(1 << 3);
    /// 270° clockwise rotation.
    pub const ROTATE_270: Self = Self(1 << 4);

    // Client wire bits.
    const RAW_FLIP_H: i32 = 1;
    const RAW_FLIP_V: i32 = 2;
    const RAW_ROT_90: i32 = 4;
    const RAW_ROT_180: i32 = Self::RAW_FLIP_H | Self::RAW_FLIP_V;
    const RAW_ROT_270: i32 = Self::RAW_ROT_180 | Self::RAW_ROT_90;

    /// Decodes the client encoding.
    ///
    /// 180° and 270° already contain both flips, so they map to a single
    /// rotation bit. 90° may still be combined with one flip.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        if raw == Self::RAW_ROT_270 {
            return Self::ROTATE_270;
        }
        if raw == Self::RAW_ROT_180 {
            return Self::ROTATE_180;
        }
        let mut bits = 0;
        if raw & Self::RAW_FLIP_H != 0 {
            bits |= Self::FLIP_H.0;
        }
        if raw & Self::RAW_FLIP_V != 0 {
            bits |= Self::FLIP_V.0;
        }
        if raw & Self::RAW_ROT_90 != 0 {
            bits |= Self::ROTATE_90.0;
        }
        Self(bits)
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw bit set.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::ops::BitOr for LayerTransform {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for LayerTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("LayerTransform(IDENTITY)");
        }
        let names = [
            (Self::FLIP_H, "FLIP_H"),
            (Self::FLIP_V, "FLIP_V"),
            (Self::ROTATE_90, "ROTATE_90"),
            (Self::ROTATE_180, "ROTATE_180"),
            (Self::ROTATE_270, "ROTATE_270"),
        ];
        f.write_str("LayerTransform(")?;
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}
