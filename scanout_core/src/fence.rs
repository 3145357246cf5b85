// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization tokens.
//!
//! A [`Fence`] signals when a buffer is safe to read or reuse. It is an
//! owned, move-only value: whoever holds it is responsible for it, and
//! handing it out moves it. Code that needs a second reference to the same
//! sync point calls [`Fence::dup`], mirroring `dup(2)` on a sync-file
//! descriptor.

use core::fmt;

/// An owned synchronization token.
///
/// Not `Clone`: a fence has exactly one owner at a time.
#[derive(PartialEq, Eq, Hash)]
pub struct Fence {
    raw: u64,
}

impl Fence {
    /// Wraps a raw sync-point identifier (typically a sync-file descriptor).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { raw }
    }

    /// Returns the raw sync-point identifier.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.raw
    }

    /// Returns a second owned token for the same sync point.
    #[must_use]
    pub const fn dup(&self) -> Self {
        Self { raw: self.raw }
    }

    /// Consumes the token and returns the raw identifier, transferring
    /// responsibility for it to the caller.
    #[must_use]
    pub const fn into_raw(self) -> u64 {
        self.raw
    }
}

impl fmt::Debug for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fence({})", self.raw)
    }
}
