// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening policy.
//!
//! Once a scene has been stable for a number of vsyncs, the client is asked
//! to render one frame with every layer client composited. That frame goes
//! out on a single plane, which saves bandwidth for as long as the scene
//! stays still.
//!
//! ```text
//!   Disabled ◄──── set_enabled(false) ──── (any)
//!
//!   NotRequired ──validate──► Countdown(N) ──vsync──► ... ──► Countdown(1)
//!        ▲                         │                               │
//!        └──── scene changed ──────┘                             vsync
//!                                                                  ▼
//!   Flattened ◄──────── validate ──────────────── ClientRefreshRequested
//! ```
//!
//! This is an optimization only; timing is best effort.

use serde::Serialize;

use crate::settings::FlatteningSettings;

/// Position in the flattening cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FlatteningState {
    /// Flattening is turned off.
    Disabled,
    /// Nothing to do until the next validation.
    NotRequired,
    /// The current frame was flattened.
    Flattened,
    /// The client was asked to re-render a flattened frame.
    ClientRefreshRequested,
    /// Stable vsyncs still needed before a refresh is requested.
    Countdown(u32),
}

/// What validation should do about flattening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidateAction {
    /// Nothing.
    None,
    /// Compose this frame entirely on the client.
    Flatten,
    /// Start counting vsyncs; the flattening notifier must be enabled.
    StartCountdown,
}

/// What a flattening vsync resulted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VsyncOutcome {
    /// Keep counting.
    Continue,
    /// Countdown over without a request; the notifier can stop.
    Stop,
    /// Countdown completed; ask the client to refresh and stop the notifier.
    RefreshRequested,
}

/// Flattening state machine for one display.
#[derive(Clone, Debug)]
pub struct FlatteningController {
    state: FlatteningState,
    countdown: u32,
}

impl FlatteningController {
    /// Creates a controller from settings.
    #[must_use]
    pub fn new(settings: &FlatteningSettings) -> Self {
        Self {
            state: if settings.enabled {
                FlatteningState::NotRequired
            } else {
                FlatteningState::Disabled
            },
            countdown: settings.countdown_vsyncs.max(1),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FlatteningState {
        self.state
    }

    /// Turns flattening on or off. Turning it on from `Disabled` starts at
    /// `NotRequired`; otherwise the state is kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.state = FlatteningState::Disabled;
        } else if self.state == FlatteningState::Disabled {
            self.state = FlatteningState::NotRequired;
        }
    }

    /// Advances the machine at validation time.
    ///
    /// `skip` is set when flattening cannot help, for example with a single
    /// layer.
    pub fn on_validate(&mut self, skip: bool) -> ValidateAction {
        match self.state {
            FlatteningState::Disabled => ValidateAction::None,
            _ if skip => {
                self.state = FlatteningState::NotRequired;
                ValidateAction::None
            }
            FlatteningState::ClientRefreshRequested => {
                self.state = FlatteningState::Flattened;
                ValidateAction::Flatten
            }
            _ => {
                self.state = FlatteningState::Countdown(self.countdown);
                ValidateAction::StartCountdown
            }
        }
    }

    /// Advances the machine on a flattening vsync.
    ///
    /// `scene_changed` is set when the layer set changed since validation,
    /// which abandons the countdown.
    pub fn on_vsync(&mut self, scene_changed: bool) -> VsyncOutcome {
        match self.state {
            FlatteningState::Countdown(_) if scene_changed => {
                self.state = FlatteningState::NotRequired;
                VsyncOutcome::Stop
            }
            FlatteningState::Countdown(remaining) if remaining <= 1 => {
                self.state = FlatteningState::ClientRefreshRequested;
                VsyncOutcome::RefreshRequested
            }
            FlatteningState::Countdown(remaining) => {
                self.state = FlatteningState::Countdown(remaining - 1);
                VsyncOutcome::Continue
            }
            _ => VsyncOutcome::Stop,
        }
    }
}
