// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display identification.
//!
//! [`DisplayHandle`] is the client-visible handle of a display. The host
//! assigns handles when it adds displays; the core passes them through
//! without interpreting them, except that [`DisplayHandle::PRIMARY`] is
//! never destroyed and falls back to headless operation when unplugged.

use core::fmt;

use serde::Serialize;

/// Identifies one display of a [`Composer`](crate::composer::Composer).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct DisplayHandle(pub u64);

impl DisplayHandle {
    /// The primary display.
    pub const PRIMARY: Self = Self(0);

    /// Returns `true` for the primary display.
    #[inline]
    #[must_use]
    pub const fn is_primary(self) -> bool {
        self.0 == Self::PRIMARY.0
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayHandle({})", self.0)
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Display class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DisplayKind {
    /// Backed by a scanout pipeline.
    #[default]
    Physical,
    /// Renders into an output buffer. Not supported.
    Virtual,
}

/// How a display is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Built into the device.
    Internal,
    /// User-pluggable.
    External,
}
