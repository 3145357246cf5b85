// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atomic commit requests and their single point of execution.

use std::sync::Arc;

use tracing::{debug, error};

use crate::composition::Composition;
use crate::config::DisplayMode;
use crate::error::{Error, Result};
use crate::fence::Fence;
use crate::output::DisplayHandle;
use crate::pipeline::Pipeline;

/// Everything one atomic commit may change.
#[derive(Debug, Default)]
pub struct CommitRequest {
    /// Check the request without applying it.
    pub test_only: bool,
    /// New frame contents.
    pub composition: Option<Composition>,
    /// Mode change to apply with this commit.
    pub mode: Option<DisplayMode>,
    /// Explicit activation state. `None` leaves it unchanged.
    pub active: Option<bool>,
    /// Detach the currently scanned-out composition.
    pub clear_active_composition: bool,
}

impl CommitRequest {
    /// A test-only frame commit.
    #[must_use]
    pub fn test(composition: Composition, mode: Option<DisplayMode>) -> Self {
        Self {
            test_only: true,
            composition: Some(composition),
            mode,
            ..Self::default()
        }
    }

    /// A real frame commit.
    #[must_use]
    pub fn frame(composition: Composition, mode: Option<DisplayMode>) -> Self {
        Self {
            composition: Some(composition),
            mode,
            ..Self::default()
        }
    }

    /// Powers the display down.
    #[must_use]
    pub fn deactivate() -> Self {
        Self {
            active: Some(false),
            ..Self::default()
        }
    }

    /// Stops scanning out the current composition.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            clear_active_composition: true,
            ..Self::default()
        }
    }
}

/// Hands commits to the pipeline and maps failures onto the client error
/// taxonomy.
///
/// Every commit of a display goes through here, so this is where a failed
/// real commit is reported as an anomaly.
#[derive(Clone)]
pub struct AtomicCommitExecutor {
    pipeline: Arc<dyn Pipeline>,
    display: DisplayHandle,
}

impl core::fmt::Debug for AtomicCommitExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtomicCommitExecutor")
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl AtomicCommitExecutor {
    /// Creates an executor for `display` committing to `pipeline`.
    #[must_use]
    pub fn new(pipeline: Arc<dyn Pipeline>, display: DisplayHandle) -> Self {
        Self { pipeline, display }
    }

    /// The pipeline commits go to.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.pipeline
    }

    /// Executes `request`, consuming it.
    ///
    /// A rejected test-only commit is an ordinary planning outcome. A
    /// rejected real commit means validation let through something the
    /// hardware cannot do and is logged as an error.
    pub fn execute(&self, request: CommitRequest) -> Result<Option<Fence>> {
        let test_only = request.test_only;
        match self.pipeline.commit(request) {
            Ok(fence) => Ok(fence),
            Err(err) if test_only => {
                debug!(display = %self.display, %err, "test commit rejected");
                Err(Error::BadParameter)
            }
            Err(err) => {
                error!(display = %self.display, %err, "failed to apply commit");
                Err(Error::BadParameter)
            }
        }
    }

    /// Powers the display on through the legacy path.
    pub fn activate_legacy(&self) -> Result<()> {
        self.pipeline.activate_legacy().map_err(|err| {
            error!(display = %self.display, %err, "failed to activate display");
            Error::from(err)
        })
    }
}
