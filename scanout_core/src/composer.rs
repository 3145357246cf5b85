// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-level composer device.
//!
//! A [`Composer`] owns every [`Display`] of the process behind one main lock.
//! Client calls go through [`Composer::lock`]; notifier threads take the same
//! lock before touching a display or invoking a client callback, so client
//! calls and callbacks never overlap, on any display.
//!
//! Client callbacks for vsync and refresh run with the main lock held and
//! must not call back into the composer. Hotplug callbacks run with the lock
//! released.
//!
//! Displays are always dropped with the main lock released. Dropping a
//! display joins its notifier threads, and a notifier may be blocked on the
//! main lock at that moment; once the lock is free it finds its display gone
//! and exits.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::buffer::BufferImporter;
use crate::display::{Display, DisplayParts};
use crate::error::{Error, Result};
use crate::output::{DisplayHandle, DisplayKind};
use crate::pipeline::Pipeline;
use crate::report::DisplayReport;
use crate::settings::Settings;
use crate::vsync::{TickCallback, VSyncScheduler};

/// Reports a display connecting (`true`) or disconnecting (`false`).
pub type HotplugCallback = Arc<dyn Fn(DisplayHandle, bool) + Send + Sync>;
/// Delivers a vsync timestamp in monotonic nanoseconds.
pub type VsyncCallback = Arc<dyn Fn(DisplayHandle, i64) + Send + Sync>;
/// Delivers a vsync timestamp together with the vsync period.
pub type VsyncPeriodCallback = Arc<dyn Fn(DisplayHandle, i64, i64) + Send + Sync>;
/// Asks the client to render a new frame.
pub type RefreshCallback = Arc<dyn Fn(DisplayHandle) + Send + Sync>;

#[derive(Clone, Default)]
struct Callbacks {
    hotplug: Option<HotplugCallback>,
    vsync: Option<VsyncCallback>,
    vsync_with_period: Option<VsyncPeriodCallback>,
    refresh: Option<RefreshCallback>,
}

impl core::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("hotplug", &self.hotplug.is_some())
            .field("vsync", &self.vsync.is_some())
            .field("vsync_with_period", &self.vsync_with_period.is_some())
            .field("refresh", &self.refresh.is_some())
            .finish()
    }
}

impl Callbacks {
    fn vsync(&self, handle: DisplayHandle, timestamp: i64, period_ns: i64) {
        if let Some(callback) = &self.vsync_with_period {
            callback(handle, timestamp, period_ns);
        } else if let Some(callback) = &self.vsync {
            callback(handle, timestamp);
        }
    }
}

/// State guarded by the main lock.
#[derive(Debug, Default)]
struct ComposerState {
    displays: BTreeMap<DisplayHandle, Display>,
    callbacks: Callbacks,
}

/// The composer device.
#[derive(Debug)]
pub struct Composer {
    state: Arc<Mutex<ComposerState>>,
    settings: Settings,
}

impl Composer {
    /// Creates a composer with no displays.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            state: Arc::new(Mutex::new(ComposerState::default())),
            settings,
        }
    }

    /// Settings every display is created with.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Acquires the main lock.
    pub fn lock(&self) -> ComposerGuard<'_> {
        ComposerGuard {
            state: self.state.lock(),
        }
    }

    /// Creates a display and reports it to the hotplug callback.
    ///
    /// Fails with [`Error::BadParameter`] when `handle` is taken and with
    /// [`Error::BadDisplay`] when the pipeline cannot be queried.
    pub fn add_display(
        &self,
        handle: DisplayHandle,
        kind: DisplayKind,
        pipeline: Arc<dyn Pipeline>,
        importer: Arc<dyn BufferImporter>,
        backend: Box<dyn Backend>,
    ) -> Result<()> {
        if self.state.lock().displays.contains_key(&handle) {
            return Err(Error::BadParameter);
        }

        let notifiers = VSyncScheduler::spawn(
            handle,
            Some(Arc::clone(&pipeline)),
            self.settings.vsync.fallback_period_ns,
            vsync_notifier(Arc::downgrade(&self.state), handle),
            flattening_notifier(Arc::downgrade(&self.state), handle),
        )?;
        let parts = DisplayParts {
            pipeline,
            importer,
            backend,
        };
        let display = Display::new(handle, kind, parts, &self.settings, notifiers)?;
        let connected = display.is_connected();

        let mut state = self.state.lock();
        if state.displays.contains_key(&handle) {
            drop(state);
            drop(display);
            return Err(Error::BadParameter);
        }
        state.displays.insert(handle, display);
        let hotplug = state.callbacks.hotplug.clone();
        drop(state);

        info!(display = %handle, connected, "display added");
        if let Some(hotplug) = hotplug {
            hotplug(handle, connected);
        }
        Ok(())
    }

    /// Destroys a display and reports it disconnected.
    ///
    /// The primary display cannot be removed; it becomes headless through
    /// [`handle_hotplug`](Self::handle_hotplug) instead.
    pub fn remove_display(&self, handle: DisplayHandle) -> Result<()> {
        if handle.is_primary() {
            return Err(Error::BadParameter);
        }
        let mut state = self.state.lock();
        let display = state.displays.remove(&handle).ok_or(Error::BadDisplay)?;
        let hotplug = state.callbacks.hotplug.clone();
        drop(state);

        drop(display);
        info!(display = %handle, "display removed");
        if let Some(hotplug) = hotplug {
            hotplug(handle, false);
        }
        Ok(())
    }

    /// Re-reads a display's connector after a hotplug event and reports the
    /// result. Returns whether the display is connected.
    pub fn handle_hotplug(&self, handle: DisplayHandle) -> Result<bool> {
        let mut state = self.state.lock();
        let display = state.displays.get_mut(&handle).ok_or(Error::BadDisplay)?;
        let connected = display.refresh_connection()?;
        let hotplug = state.callbacks.hotplug.clone();
        drop(state);

        debug!(display = %handle, connected, "hotplug handled");
        if let Some(hotplug) = hotplug {
            hotplug(handle, connected);
        }
        Ok(connected)
    }

    /// Registers the hotplug callback and reports every connected display
    /// to it.
    pub fn register_hotplug(&self, callback: HotplugCallback) {
        let mut state = self.state.lock();
        state.callbacks.hotplug = Some(Arc::clone(&callback));
        let connected: Vec<DisplayHandle> = state
            .displays
            .iter()
            .filter(|(_, display)| display.is_connected())
            .map(|(handle, _)| *handle)
            .collect();
        drop(state);

        for handle in connected {
            callback(handle, true);
        }
    }

    /// Registers the vsync callback.
    pub fn register_vsync(&self, callback: VsyncCallback) {
        self.state.lock().callbacks.vsync = Some(callback);
    }

    /// Registers the vsync callback that also receives the period. Takes
    /// precedence over [`register_vsync`](Self::register_vsync).
    pub fn register_vsync_with_period(&self, callback: VsyncPeriodCallback) {
        self.state.lock().callbacks.vsync_with_period = Some(callback);
    }

    /// Registers the refresh callback.
    pub fn register_refresh(&self, callback: RefreshCallback) {
        self.state.lock().callbacks.refresh = Some(callback);
    }

    /// Virtual displays are not supported.
    pub fn create_virtual_display(&self, _width: u32, _height: u32) -> Result<DisplayHandle> {
        Err(Error::Unsupported)
    }

    /// Virtual displays are not supported.
    pub fn destroy_virtual_display(&self, _handle: DisplayHandle) -> Result<()> {
        Err(Error::Unsupported)
    }

    /// Maximum number of virtual displays.
    #[must_use]
    pub fn max_virtual_display_count(&self) -> u32 {
        0
    }

    /// Reports every display. Each call starts a new statistics window.
    pub fn dump(&self) -> Vec<DisplayReport> {
        self.state
            .lock()
            .displays
            .values_mut()
            .map(Display::report)
            .collect()
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        let displays = core::mem::take(&mut self.state.lock().displays);
        drop(displays);
    }
}

/// Exclusive access to every display, holding the main lock.
pub struct ComposerGuard<'a> {
    state: MutexGuard<'a, ComposerState>,
}

impl core::fmt::Debug for ComposerGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComposerGuard")
            .field("displays", &self.handles())
            .finish_non_exhaustive()
    }
}

impl ComposerGuard<'_> {
    /// Returns a display.
    pub fn display(&self, handle: DisplayHandle) -> Result<&Display> {
        self.state.displays.get(&handle).ok_or(Error::BadDisplay)
    }

    /// Returns a display for modification.
    pub fn display_mut(&mut self, handle: DisplayHandle) -> Result<&mut Display> {
        self.state.displays.get_mut(&handle).ok_or(Error::BadDisplay)
    }

    /// Handles of every display, ascending.
    #[must_use]
    pub fn handles(&self) -> Vec<DisplayHandle> {
        self.state.displays.keys().copied().collect()
    }
}

fn vsync_notifier(state: Weak<Mutex<ComposerState>>, handle: DisplayHandle) -> TickCallback {
    Arc::new(move |timestamp: i64| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let state = state.lock();
        let Some(display) = state.displays.get(&handle) else {
            return;
        };
        state
            .callbacks
            .vsync(handle, timestamp, display.vsync_period_ns());
    })
}

fn flattening_notifier(state: Weak<Mutex<ComposerState>>, handle: DisplayHandle) -> TickCallback {
    Arc::new(move |_timestamp: i64| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        let Some(display) = state.displays.get_mut(&handle) else {
            return;
        };
        if display.on_flattening_vsync() {
            if let Some(refresh) = &state.callbacks.refresh {
                refresh(handle);
            }
        }
    })
}
