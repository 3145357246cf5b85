// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display lifecycle: hotplug, removal, and teardown.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{FakeImporter, FakePipeline, Harness, eventually, quiet_settings};
use parking_lot::Mutex;
use scanout_core::Error;
use scanout_core::backend::GenericBackend;
use scanout_core::composer::Composer;
use scanout_core::output::{DisplayHandle, DisplayKind};

const EXTERNAL: DisplayHandle = DisplayHandle(1);

type Events = Arc<Mutex<Vec<(DisplayHandle, bool)>>>;

fn record_hotplug(composer: &Composer) -> Events {
    let events = Events::default();
    composer.register_hotplug({
        let events = Arc::clone(&events);
        Arc::new(move |handle: DisplayHandle, connected: bool| {
            events.lock().push((handle, connected));
        })
    });
    events
}

fn add_external(composer: &Composer, pipeline: Arc<FakePipeline>) -> Result<(), Error> {
    composer.add_display(
        EXTERNAL,
        DisplayKind::Physical,
        pipeline,
        Arc::new(FakeImporter::default()),
        Box::new(GenericBackend),
    )
}

#[test]
fn registration_reports_existing_displays() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    let events = record_hotplug(&h.composer);
    assert_eq!(
        *events.lock(),
        vec![(DisplayHandle::PRIMARY, true)],
        "primary reported on registration"
    );
}

#[test]
fn headless_primary_is_reported_connected() {
    let h = Harness::with_settings(FakePipeline::disconnected(), quiet_settings());
    let events = record_hotplug(&h.composer);
    assert_eq!(*events.lock(), vec![(DisplayHandle::PRIMARY, true)], "headless");
}

#[test]
fn adding_and_removing_displays_is_reported() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    let events = record_hotplug(&h.composer);
    events.lock().clear();

    add_external(&h.composer, Arc::new(FakePipeline::new(0))).unwrap();
    assert_eq!(
        h.composer.lock().handles(),
        vec![DisplayHandle::PRIMARY, EXTERNAL],
        "both displays present"
    );
    assert_eq!(
        add_external(&h.composer, Arc::new(FakePipeline::new(0))),
        Err(Error::BadParameter),
        "handle already taken"
    );

    h.composer.remove_display(EXTERNAL).unwrap();
    assert_eq!(
        *events.lock(),
        vec![(EXTERNAL, true), (EXTERNAL, false)],
        "connect then disconnect"
    );
    assert_eq!(
        h.composer.lock().display(EXTERNAL).unwrap_err(),
        Error::BadDisplay,
        "gone"
    );
    assert_eq!(
        h.composer.remove_display(EXTERNAL),
        Err(Error::BadDisplay),
        "already removed"
    );
    assert_eq!(
        h.composer.remove_display(DisplayHandle::PRIMARY),
        Err(Error::BadParameter),
        "primary stays"
    );
}

#[test]
fn unplugging_an_external_display_clears_its_composition() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    let external = Arc::new(FakePipeline::new(0));
    add_external(&h.composer, Arc::clone(&external)).unwrap();
    let events = record_hotplug(&h.composer);
    events.lock().clear();

    external.set_connected(false);
    assert_eq!(h.composer.handle_hotplug(EXTERNAL), Ok(false), "disconnected");
    let commits = external.real_commits();
    assert_eq!(commits.len(), 1, "one commit");
    assert!(commits[0].clear, "active composition cleared");

    external.set_connected(true);
    assert_eq!(h.composer.handle_hotplug(EXTERNAL), Ok(true), "reconnected");
    assert_eq!(
        *events.lock(),
        vec![(EXTERNAL, false), (EXTERNAL, true)],
        "both transitions reported"
    );

    let guard = h.composer.lock();
    let display = guard.display(EXTERNAL).unwrap();
    assert_eq!(display.display_configs(), vec![3, 4], "fresh config ids");
    assert_eq!(display.active_config(), Ok(3), "preferred re-selected");
}

#[test]
fn unplugging_the_primary_makes_it_headless() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    h.pipeline.set_connected(false);

    assert_eq!(
        h.composer.handle_hotplug(DisplayHandle::PRIMARY),
        Ok(true),
        "headless primary stays connected"
    );
    assert!(h.pipeline.commits().is_empty(), "headless displays are not cleared");
    let guard = h.composer.lock();
    let display = guard.display(DisplayHandle::PRIMARY).unwrap();
    assert!(display.is_headless(), "headless");
    assert_eq!(display.display_configs().len(), 1, "placeholder config");
}

#[test]
fn removal_waits_for_notifiers_and_stops_vsync() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    add_external(&h.composer, Arc::new(FakePipeline::new(0))).unwrap();
    let external_vsyncs = Arc::new(AtomicUsize::new(0));
    h.composer.register_vsync({
        let external_vsyncs = Arc::clone(&external_vsyncs);
        Arc::new(move |handle: DisplayHandle, _timestamp: i64| {
            if handle == EXTERNAL {
                external_vsyncs.fetch_add(1, Ordering::Relaxed);
            }
        })
    });
    h.composer
        .lock()
        .display_mut(EXTERNAL)
        .unwrap()
        .set_vsync_enabled(true);
    assert!(
        eventually(|| external_vsyncs.load(Ordering::Relaxed) > 0),
        "vsyncs arrive"
    );

    h.composer.remove_display(EXTERNAL).unwrap();
    let after_removal = external_vsyncs.load(Ordering::Relaxed);
    std::thread::sleep(std::time::Duration::from_millis(100));
    assert_eq!(
        external_vsyncs.load(Ordering::Relaxed),
        after_removal,
        "no vsync after removal returns"
    );
}

#[test]
fn dropping_the_composer_joins_running_notifiers() {
    let h = Harness::with_settings(FakePipeline::new(1), quiet_settings());
    let vsyncs = Arc::new(AtomicUsize::new(0));
    h.composer.register_vsync({
        let vsyncs = Arc::clone(&vsyncs);
        Arc::new(move |_handle: DisplayHandle, _timestamp: i64| {
            vsyncs.fetch_add(1, Ordering::Relaxed);
        })
    });
    h.composer
        .lock()
        .display_mut(DisplayHandle::PRIMARY)
        .unwrap()
        .set_vsync_enabled(true);
    assert!(eventually(|| vsyncs.load(Ordering::Relaxed) > 0), "running");

    drop(h);
    let after_drop = vsyncs.load(Ordering::Relaxed);
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert_eq!(vsyncs.load(Ordering::Relaxed), after_drop, "stopped");
}

#[test]
fn virtual_displays_are_unsupported() {
    let composer = Composer::new(quiet_settings());
    assert_eq!(composer.max_virtual_display_count(), 0, "none");
    assert_eq!(
        composer.create_virtual_display(640, 480),
        Err(Error::Unsupported),
        "create"
    );
    assert_eq!(
        composer.destroy_virtual_display(DisplayHandle(5)),
        Err(Error::Unsupported),
        "destroy"
    );
}
