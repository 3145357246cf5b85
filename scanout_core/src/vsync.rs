// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic vsync notifiers.
//!
//! A [`VSyncWorker`] is a thread that, while enabled, waits for each vsync
//! and hands its timestamp to a callback. Hardware vblank events are used
//! when the pipeline provides them; otherwise vsyncs are synthesized on a
//! grid phase-locked to the previous one.
//!
//! Callbacks run on the worker thread with no worker lock held, so a
//! callback may enable or disable its own worker. [`VSyncWorker::stop`]
//! joins the thread: once it returns, no further callback runs. Stopping
//! from a thread that holds a lock the callback needs would deadlock; see
//! [`Composer`](crate::composer::Composer) for how teardown avoids that.
//!
//! [`VSyncScheduler`] bundles the two notifiers each display runs: one that
//! forwards vsync to the client and one that drives flattening.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::output::DisplayHandle;
use crate::pipeline::Pipeline;
use crate::time::{monotonic_ns, next_phased_vsync};

/// Receives vsync timestamps in monotonic nanoseconds.
pub type TickCallback = Arc<dyn Fn(i64) + Send + Sync>;

#[derive(Debug, Default)]
struct Control {
    enabled: bool,
    exit: bool,
    last_timestamp: Option<i64>,
}

struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
    period_ns: Arc<AtomicI64>,
    fallback_period_ns: i64,
}

impl Shared {
    fn period_ns(&self) -> i64 {
        match self.period_ns.load(Ordering::Relaxed) {
            period if period > 0 => period,
            _ => self.fallback_period_ns,
        }
    }
}

/// A vsync notifier thread.
pub struct VSyncWorker {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
    name: String,
}

impl fmt::Debug for VSyncWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VSyncWorker")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl VSyncWorker {
    /// Spawns a disabled worker.
    ///
    /// `period_ns` is read before every synthetic wait; non-positive values
    /// select `fallback_period_ns`.
    pub fn spawn(
        name: String,
        pipeline: Option<Arc<dyn Pipeline>>,
        period_ns: Arc<AtomicI64>,
        fallback_period_ns: i64,
        callback: TickCallback,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            control: Mutex::new(Control::default()),
            wake: Condvar::new(),
            period_ns,
            fallback_period_ns,
        });
        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn({
                let shared = Arc::clone(&shared);
                let name = name.clone();
                move || run(&name, &shared, pipeline.as_deref(), &*callback)
            })
            .map_err(|err| {
                debug!(worker = %name, %err, "failed to spawn vsync worker");
                Error::BadDisplay
            })?;
        Ok(Self {
            shared,
            thread: Some(thread),
            name,
        })
    }

    /// Starts or stops delivering vsyncs. Either way, the phase of the
    /// synthetic grid is forgotten.
    pub fn set_enabled(&self, enabled: bool) {
        let mut control = self.shared.control.lock();
        control.enabled = enabled;
        control.last_timestamp = None;
        drop(control);
        self.shared.wake.notify_all();
    }

    /// Returns `true` while vsyncs are being delivered.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.control.lock().enabled
    }

    /// Stops the thread and waits for it to finish. Idempotent.
    pub fn stop(&mut self) {
        {
            let mut control = self.shared.control.lock();
            control.exit = true;
            control.enabled = false;
        }
        self.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                debug!(worker = %self.name, "vsync worker panicked");
            }
        }
    }
}

impl Drop for VSyncWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    name: &str,
    shared: &Shared,
    pipeline: Option<&dyn Pipeline>,
    callback: &(dyn Fn(i64) + Send + Sync),
) {
    debug!(worker = name, "vsync worker started");
    loop {
        {
            let mut control = shared.control.lock();
            while !control.exit && !control.enabled {
                shared.wake.wait(&mut control);
            }
            if control.exit {
                break;
            }
        }

        let Some(timestamp) = wait_for_vsync(shared, pipeline) else {
            continue;
        };

        {
            let mut control = shared.control.lock();
            if control.exit {
                break;
            }
            if !control.enabled {
                continue;
            }
            control.last_timestamp = Some(timestamp);
        }

        callback(timestamp);
    }
    debug!(worker = name, "vsync worker exited");
}

/// Waits for the next vsync. `None` when the wait was cut short by a
/// disable or stop request.
fn wait_for_vsync(shared: &Shared, pipeline: Option<&dyn Pipeline>) -> Option<i64> {
    if let Some(pipeline) = pipeline {
        match pipeline.wait_vblank() {
            Ok(Some(timestamp)) => return Some(timestamp),
            Ok(None) => {}
            Err(err) => trace!(%err, "vblank wait failed, synthesizing"),
        }
    }

    let period = shared.period_ns();
    let now = monotonic_ns();
    let mut control = shared.control.lock();
    let target = next_phased_vsync(period, now, control.last_timestamp);
    let deadline = Instant::now() + Duration::from_nanos(u64::try_from(target - now).unwrap_or(0));
    loop {
        if control.exit || !control.enabled {
            return None;
        }
        if shared.wake.wait_until(&mut control, deadline).timed_out() {
            return Some(target);
        }
    }
}

/// The two notifiers of one display.
#[derive(Debug)]
pub struct VSyncScheduler {
    vsync: VSyncWorker,
    flattening: VSyncWorker,
    period_ns: Arc<AtomicI64>,
    fallback_period_ns: i64,
}

impl VSyncScheduler {
    /// Spawns both notifiers for `display`, disabled.
    pub fn spawn(
        display: DisplayHandle,
        pipeline: Option<Arc<dyn Pipeline>>,
        fallback_period_ns: i64,
        on_vsync: TickCallback,
        on_flattening_vsync: TickCallback,
    ) -> Result<Self> {
        let period_ns = Arc::new(AtomicI64::new(0));
        let vsync = VSyncWorker::spawn(
            format!("vsync-{display}"),
            pipeline.clone(),
            Arc::clone(&period_ns),
            fallback_period_ns,
            on_vsync,
        )?;
        let flattening = VSyncWorker::spawn(
            format!("flatten-{display}"),
            pipeline,
            Arc::clone(&period_ns),
            fallback_period_ns,
            on_flattening_vsync,
        )?;
        Ok(Self {
            vsync,
            flattening,
            period_ns,
            fallback_period_ns,
        })
    }

    /// Sets the native vsync period. Zero or negative selects the fallback.
    pub fn set_period_ns(&self, period_ns: i64) {
        self.period_ns.store(period_ns, Ordering::Relaxed);
    }

    /// Effective synthetic vsync period.
    #[must_use]
    pub fn period_ns(&self) -> i64 {
        match self.period_ns.load(Ordering::Relaxed) {
            period if period > 0 => period,
            _ => self.fallback_period_ns,
        }
    }

    /// Enables or disables client vsync delivery.
    pub fn set_vsync_enabled(&self, enabled: bool) {
        self.vsync.set_enabled(enabled);
    }

    /// Returns `true` while client vsyncs are delivered.
    #[must_use]
    pub fn vsync_enabled(&self) -> bool {
        self.vsync.is_enabled()
    }

    /// Enables or disables the flattening notifier.
    pub fn set_flattening_enabled(&self, enabled: bool) {
        self.flattening.set_enabled(enabled);
    }

    /// Returns `true` while the flattening notifier runs.
    #[must_use]
    pub fn flattening_enabled(&self) -> bool {
        self.flattening.is_enabled()
    }

    /// Stops both notifiers, waiting for in-flight callbacks.
    pub fn stop(&mut self) {
        self.flattening.stop();
        self.vsync.stop();
    }
}
