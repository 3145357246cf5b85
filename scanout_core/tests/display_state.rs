// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration, colour, power, and identity of a display.

mod common;

use std::sync::atomic::Ordering;

use common::{FakePipeline, Harness, add_device_layer, mode, quiet_settings};
use scanout_core::Error;
use scanout_core::color::{ColorMode, ColorTransformHint, ContentType, IDENTITY_MATRIX, PowerMode, RenderIntent};
use scanout_core::config::Attribute;
use scanout_core::flattening::FlatteningState;
use scanout_core::geometry::Frame;
use scanout_core::layer::{Dataspace, LayerId};
use scanout_core::output::{ConnectionType, DisplayHandle, DisplayKind};

fn harness() -> Harness {
    Harness::with_settings(FakePipeline::new(1), quiet_settings())
}

#[test]
fn preferred_mode_is_staged_for_the_first_present() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();
    add_device_layer(display, &h.importer, 1, 0, (1920, 1080));

    assert_eq!(display.active_config(), Ok(1), "preferred config is active");
    assert_eq!(
        display.staged_mode(),
        Some(&mode(1920, 1080, 60.0, true)),
        "activation waits for a present"
    );

    display.validate().unwrap();
    assert_eq!(
        h.pipeline.test_commits()[0].mode,
        Some(mode(1920, 1080, 60.0, true)),
        "the test commit checks the mode change too"
    );
    display.present().unwrap();
    assert_eq!(
        h.pipeline.real_commits()[0].mode,
        Some(mode(1920, 1080, 60.0, true)),
        "mode applied with the frame"
    );
    assert!(display.staged_mode().is_none(), "cleared after success");

    display.validate().unwrap();
    display.present().unwrap();
    assert!(h.pipeline.real_commits()[1].mode.is_none(), "applied only once");
}

#[test]
fn switching_configs_stages_and_resizes_the_client_target() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(display.display_configs(), vec![1, 2], "both modes offered");
    display.set_active_config(2).unwrap();
    assert_eq!(display.active_config(), Ok(2), "active switched");
    assert_eq!(
        display.staged_mode(),
        Some(&mode(1280, 720, 60.0, false)),
        "new mode staged"
    );
    assert_eq!(
        display.client_target().display_frame(),
        Frame::from_size(1280, 720),
        "client target follows the mode"
    );

    assert_eq!(display.set_active_config(9), Err(Error::BadConfig), "unknown");
    assert_eq!(display.active_config(), Ok(2), "unchanged on failure");
    assert_eq!(
        display.set_active_config_with_constraints(1),
        Err(Error::BadConfig),
        "seamless switches unsupported"
    );
}

#[test]
fn attributes_are_derived_from_the_mode() {
    let h = harness();
    let guard = h.composer.lock();
    let display = guard.display(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(display.attribute(1, Attribute::Width), Ok(1920), "width");
    assert_eq!(display.attribute(1, Attribute::Height), Ok(1080), "height");
    assert_eq!(
        display.attribute(1, Attribute::VsyncPeriod),
        Ok(16_666_666),
        "1e9 / 60"
    );
    assert_eq!(display.attribute(1, Attribute::DpiX), Ok(93_784), "x dpi");
    assert_eq!(display.attribute(1, Attribute::DpiY), Ok(94_593), "y dpi");
    assert_ne!(
        display.attribute(1, Attribute::ConfigGroup),
        display.attribute(2, Attribute::ConfigGroup),
        "different resolutions use different groups"
    );
    assert_eq!(
        display.attribute(7, Attribute::Width),
        Err(Error::BadConfig),
        "unknown config"
    );
    assert_eq!(display.vsync_period(), Ok(16_666_666), "active period");
    assert_eq!(display.vsync_period_ns(), 16_666_666, "notifier period");
}

#[test]
fn only_native_color_is_supported() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(display.color_modes(), vec![ColorMode::Native], "native only");
    assert_eq!(display.set_color_mode(ColorMode::Native), Ok(()), "native");
    assert_eq!(
        display.set_color_mode(ColorMode::Standard(7)),
        Err(Error::Unsupported),
        "other modes"
    );
    assert_eq!(
        display.render_intents(ColorMode::Native),
        Ok(vec![RenderIntent::Colorimetric]),
        "colorimetric"
    );
    assert_eq!(
        display.render_intents(ColorMode::Standard(1)),
        Err(Error::BadParameter),
        "no intents for other modes"
    );
    assert_eq!(
        display.set_color_mode_with_intent(ColorMode::Native, RenderIntent::Enhance),
        Err(Error::Unsupported),
        "only colorimetric"
    );

    assert_eq!(
        display.set_color_transform(None, ColorTransformHint::ArbitraryMatrix),
        Err(Error::BadParameter),
        "arbitrary matrix needs a matrix"
    );
    let mut matrix = IDENTITY_MATRIX;
    matrix[0] = 0.5;
    display
        .set_color_transform(Some(&matrix), ColorTransformHint::ArbitraryMatrix)
        .unwrap();
    assert_eq!(display.color_transform().matrix, matrix, "matrix copied");
    assert_eq!(
        display.color_transform().hint,
        ColorTransformHint::ArbitraryMatrix,
        "hint stored"
    );
}

#[test]
fn power_modes_drive_the_pipeline() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    display.set_power_mode(PowerMode::Off).unwrap();
    let commits = h.pipeline.real_commits();
    assert_eq!(commits.len(), 1, "deactivation commit");
    assert_eq!(commits[0].active, Some(false), "deactivates");
    assert!(commits[0].layers.is_empty(), "without a composition");

    display.set_power_mode(PowerMode::On).unwrap();
    assert_eq!(
        h.pipeline.legacy_activations.load(Ordering::Relaxed),
        1,
        "on uses the legacy path"
    );
    assert_eq!(display.power_mode(), Some(PowerMode::On), "recorded");

    assert_eq!(display.set_power_mode(PowerMode::Doze), Err(Error::Unsupported), "doze");
    assert_eq!(
        display.set_power_mode(PowerMode::DozeSuspend),
        Err(Error::Unsupported),
        "doze suspend"
    );
    assert_eq!(display.power_mode(), Some(PowerMode::On), "unchanged");
    assert!(!display.doze_support(), "no doze");
}

#[test]
fn identity_and_capabilities() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(display.name(), "display-31", "named after the connector");
    assert_eq!(display.display_type(), DisplayKind::Physical, "physical");
    assert_eq!(display.connection_type(), Ok(ConnectionType::External), "HDMI");
    let id = display.identification_data().unwrap();
    assert_eq!(id.port, 31, "connector port");
    assert_eq!(id.data.len(), 8, "EDID blob");
    assert!(display.capabilities().is_empty(), "no capabilities");
    assert!(!display.brightness_support(), "no brightness");
    assert_eq!(display.set_display_brightness(0.5), Err(Error::Unsupported), "brightness");
    assert!(display.hdr_capabilities().types.is_empty(), "no HDR");
    assert_eq!(display.display_requests().display_flags, 0, "no requests");
    assert_eq!(display.set_content_type(ContentType::None), Ok(()), "none");
    assert_eq!(
        display.set_content_type(ContentType::Game),
        Err(Error::Unsupported),
        "game"
    );
    assert_eq!(
        display.set_auto_low_latency_mode(true),
        Err(Error::Unsupported),
        "ALLM"
    );
    assert_eq!(
        display.set_output_buffer(scanout_core::buffer::BufferHandle(1), None),
        Err(Error::Unsupported),
        "no output buffers"
    );
}

#[test]
fn client_target_support_checks_limits_and_dataspace() {
    let h = harness();
    let guard = h.composer.lock();
    let display = guard.display(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(
        display.client_target_support(1920, 1080, 0, Dataspace::UNKNOWN),
        Ok(()),
        "plain target"
    );
    assert_eq!(
        display.client_target_support(1920, 1080, 0, Dataspace(1 << 16)),
        Err(Error::Unsupported),
        "explicit dataspace"
    );
}

#[test]
fn layer_lifecycle_errors() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    assert_eq!(display.destroy_layer(LayerId::RESERVED), Ok(()), "empty store");
    let id = display.create_layer();
    assert_eq!(id, LayerId::FIRST, "identifiers start after the reserved one");
    assert_eq!(display.destroy_layer(LayerId(99)), Err(Error::BadLayer), "unknown");
    assert_eq!(display.destroy_layer(id), Ok(()), "known");
    assert_eq!(display.destroy_layer(id), Err(Error::BadLayer), "already gone");
    assert!(display.layer(id).is_err(), "no longer reachable");
    assert_ne!(display.create_layer(), id, "identifiers are not reused");
}

#[test]
fn reports_start_a_new_statistics_window() {
    let h = harness();
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();
    add_device_layer(display, &h.importer, 1, 0, (100, 100));
    for _ in 0..3 {
        display.validate().unwrap();
        display.present().unwrap();
    }
    drop(guard);

    let first = h.composer.dump();
    assert_eq!(first.len(), 1, "one display");
    assert_eq!(first[0].connector, "HDMI-A-1", "connector name");
    assert_eq!(first[0].flattening, FlatteningState::Disabled, "disabled");
    assert_eq!(first[0].totals.total_frames, 3, "three presents");
    assert_eq!(first[0].delta, first[0].totals, "first window covers all");

    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();
    display.validate().unwrap();
    display.present().unwrap();
    drop(guard);

    let second = h.composer.dump();
    assert_eq!(second[0].totals.total_frames, 4, "lifetime total");
    assert_eq!(second[0].delta.total_frames, 1, "since the last dump");
    assert_eq!(second[0].delta.total_pixops, 100 * 100, "one validation");
}

#[test]
fn headless_primary_accepts_everything_without_scanout() {
    let h = Harness::with_settings(FakePipeline::disconnected(), quiet_settings());
    let mut guard = h.composer.lock();
    let display = guard.display_mut(DisplayHandle::PRIMARY).unwrap();

    assert!(display.is_headless(), "nothing plugged in");
    assert!(display.is_connected(), "still reported connected");
    assert_eq!(display.name(), "null-display", "placeholder name");
    assert_eq!(display.connection_type(), Ok(ConnectionType::Internal), "internal");
    assert_eq!(display.display_configs().len(), 1, "one placeholder config");
    let config = display.active_config().unwrap();
    assert_eq!(display.attribute(config, Attribute::Width), Ok(1024), "width");
    assert_eq!(display.attribute(config, Attribute::Height), Ok(768), "height");
    let id = display.identification_data().unwrap();
    assert!(id.data.is_empty(), "no EDID");
    assert_eq!(id.port, 0, "no port");
    assert_eq!(
        display.client_target_support(1, 1, 0, Dataspace(5)),
        Ok(()),
        "anything goes"
    );

    display.create_layer();
    assert_eq!(display.validate().unwrap().changed_types, 0, "nothing to do");
    assert!(display.present().unwrap().is_none(), "no fence");
    display.set_power_mode(PowerMode::Off).unwrap();
    assert!(h.pipeline.commits().is_empty(), "pipeline untouched");
    drop(guard);

    assert_eq!(h.composer.dump()[0].connector, "NULL-DISPLAY", "dump name");
}

#[test]
fn unqueryable_pipeline_is_a_bad_display() {
    let composer = scanout_core::composer::Composer::new(quiet_settings());
    let pipeline = FakePipeline::new(0);
    pipeline.fail_queries.store(true, Ordering::Relaxed);
    let result = composer.add_display(
        DisplayHandle::PRIMARY,
        DisplayKind::Physical,
        std::sync::Arc::new(pipeline),
        std::sync::Arc::new(common::FakeImporter::default()),
        Box::new(scanout_core::backend::GenericBackend),
    );
    assert_eq!(result, Err(Error::BadDisplay), "connector query failed");
    assert!(composer.lock().handles().is_empty(), "nothing added");
}
