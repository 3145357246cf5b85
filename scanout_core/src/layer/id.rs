// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity.

use core::fmt;

/// Identifies a layer within one display.
///
/// Identifiers are issued in strictly increasing order by a
/// [`LayerStore`](super::LayerStore) and never reused for the lifetime of
/// that store. [`LayerId::RESERVED`] is never issued.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl LayerId {
    /// The lowest identifier. Never issued, so destroying it can be told
    /// apart from destroying a real layer.
    pub const RESERVED: Self = Self(1);

    /// The first identifier a fresh store hands out.
    pub const FIRST: Self = Self(2);

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
