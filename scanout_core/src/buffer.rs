// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client buffers and the import collaborator.
//!
//! Clients hand over opaque [`BufferHandle`]s. Turning a handle into scanout
//! metadata is vendor specific, so it is delegated to a [`BufferImporter`].

use core::fmt;

use crate::error::PipelineError;

/// Opaque client buffer handle.
///
/// The core never interprets the value; only the [`BufferImporter`] does.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferHandle(pub u64);

impl fmt::Debug for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferHandle({:#x})", self.0)
    }
}

/// One memory plane of an imported buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferPlane {
    /// Backing descriptor (for example a dma-buf file descriptor).
    pub descriptor: u64,
    /// Row stride in bytes.
    pub stride: u32,
    /// Byte offset of the plane within the backing memory.
    pub offset: u32,
}

/// Scanout metadata extracted from a client buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format as a fourcc code.
    pub format: u32,
    /// Memory planes, in format order.
    pub planes: Vec<BufferPlane>,
}

/// Turns opaque buffer handles into [`BufferInfo`].
///
/// Implementations are shared between the client-facing thread and the
/// display's notifier threads and must be thread safe.
pub trait BufferImporter: Send + Sync {
    /// Extracts scanout metadata for `handle`.
    fn import(&self, handle: BufferHandle) -> Result<BufferInfo, PipelineError>;

    /// Returns `true` if `handle` can be scanned out directly.
    ///
    /// The default probes with [`import`](Self::import).
    fn is_usable(&self, handle: BufferHandle) -> bool {
        self.import(handle).is_ok()
    }
}
