// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory collaborators for driving a [`Composer`] in tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]
#![allow(unreachable_pub, reason = "shared between test binaries")]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use scanout_core::backend::GenericBackend;
use scanout_core::buffer::{BufferHandle, BufferImporter, BufferInfo};
use scanout_core::commit::CommitRequest;
use scanout_core::composer::Composer;
use scanout_core::composition::{CompositionLayer, LayerSource, PlaneAssignment};
use scanout_core::config::{DisplayMode, ModeFlags};
use scanout_core::display::Display;
use scanout_core::fence::Fence;
use scanout_core::geometry::Frame;
use scanout_core::layer::{CompositionType, Dataspace, LayerId};
use scanout_core::output::{DisplayHandle, DisplayKind};
use scanout_core::pipeline::{
    AvailablePlanes, ConnectorInfo, ConnectorKind, Pipeline, Plane, PlaneKind,
};
use scanout_core::settings::{FlatteningSettings, Settings};
use scanout_core::PipelineError;

/// What a commit carried, as observed by [`FakePipeline`].
#[derive(Clone, Debug, PartialEq)]
pub struct CommitRecord {
    pub test_only: bool,
    pub layers: Vec<LayerSource>,
    pub acquire_fences: Vec<Option<u64>>,
    pub mode: Option<DisplayMode>,
    pub active: Option<bool>,
    pub clear: bool,
}

/// A pipeline that records every commit.
#[derive(Debug)]
pub struct FakePipeline {
    pub connector: Mutex<ConnectorInfo>,
    pub planes: Vec<Plane>,
    pub commits: Mutex<Vec<CommitRecord>>,
    pub fail_test_commits: AtomicBool,
    pub fail_real_commits: AtomicBool,
    pub fail_queries: AtomicBool,
    pub legacy_activations: AtomicU64,
    next_fence: AtomicU64,
}

pub fn mode(width: u32, height: u32, refresh_hz: f32, preferred: bool) -> DisplayMode {
    DisplayMode {
        name: format!("{width}x{height}"),
        width,
        height,
        refresh_hz,
        flags: ModeFlags {
            preferred,
            ..ModeFlags::default()
        },
    }
}

pub fn connected_connector() -> ConnectorInfo {
    ConnectorInfo {
        id: 31,
        name: "HDMI-A-1".to_owned(),
        kind: ConnectorKind::External,
        connected: true,
        mm_width: 520,
        mm_height: 290,
        modes: vec![
            mode(1920, 1080, 60.0, true),
            mode(1280, 720, 60.0, false),
        ],
        edid: Some(vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]),
    }
}

impl FakePipeline {
    /// A connected 1080p pipeline with one primary and `overlays` overlay
    /// planes.
    pub fn new(overlays: u32) -> Self {
        let mut planes = vec![Plane {
            id: 1,
            kind: PlaneKind::Primary,
        }];
        planes.extend((0..overlays).map(|i| Plane {
            id: 10 + i,
            kind: PlaneKind::Overlay,
        }));
        Self::with_connector(connected_connector(), planes)
    }

    pub fn with_connector(connector: ConnectorInfo, planes: Vec<Plane>) -> Self {
        Self {
            connector: Mutex::new(connector),
            planes,
            commits: Mutex::new(Vec::new()),
            fail_test_commits: AtomicBool::new(false),
            fail_real_commits: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
            legacy_activations: AtomicU64::new(0),
            next_fence: AtomicU64::new(100),
        }
    }

    pub fn disconnected() -> Self {
        let connector = ConnectorInfo {
            connected: false,
            modes: Vec::new(),
            edid: None,
            ..connected_connector()
        };
        Self::with_connector(
            connector,
            vec![Plane {
                id: 1,
                kind: PlaneKind::Primary,
            }],
        )
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.commits.lock().clone()
    }

    pub fn real_commits(&self) -> Vec<CommitRecord> {
        self.commits().into_iter().filter(|c| !c.test_only).collect()
    }

    pub fn test_commits(&self) -> Vec<CommitRecord> {
        self.commits().into_iter().filter(|c| c.test_only).collect()
    }

    pub fn set_connected(&self, connected: bool) {
        let mut connector = self.connector.lock();
        connector.connected = connected;
        connector.modes = if connected {
            connected_connector().modes
        } else {
            Vec::new()
        };
    }
}

impl Pipeline for FakePipeline {
    fn connector(&self) -> Result<ConnectorInfo, PipelineError> {
        if self.fail_queries.load(Ordering::Relaxed) {
            return Err(PipelineError::Query("connector gone".to_owned()));
        }
        Ok(self.connector.lock().clone())
    }

    fn planes(&self) -> Vec<Plane> {
        self.planes.clone()
    }

    fn plan_placement(
        &self,
        layers: &[CompositionLayer],
        planes: &AvailablePlanes,
    ) -> Result<Vec<PlaneAssignment>, PipelineError> {
        let ids: Vec<u32> = planes
            .primary
            .iter()
            .take(1)
            .chain(planes.overlay.iter())
            .copied()
            .collect();
        if layers.len() > ids.len() {
            return Err(PipelineError::Placement(format!(
                "{} layers, {} planes",
                layers.len(),
                ids.len()
            )));
        }
        Ok(ids
            .into_iter()
            .enumerate()
            .take(layers.len())
            .map(|(layer, plane)| PlaneAssignment { layer, plane })
            .collect())
    }

    fn commit(&self, request: CommitRequest) -> Result<Option<Fence>, PipelineError> {
        let (layers, acquire_fences): (Vec<LayerSource>, Vec<Option<u64>>) = request
            .composition
            .as_ref()
            .map(|c| {
                (
                    c.layers.iter().map(|l| l.source).collect(),
                    c.layers
                        .iter()
                        .map(|l| l.acquire_fence.as_ref().map(Fence::raw))
                        .collect(),
                )
            })
            .unwrap_or_default();
        self.commits.lock().push(CommitRecord {
            test_only: request.test_only,
            layers,
            acquire_fences,
            mode: request.mode.clone(),
            active: request.active,
            clear: request.clear_active_composition,
        });

        let failing = if request.test_only {
            &self.fail_test_commits
        } else {
            &self.fail_real_commits
        };
        if failing.load(Ordering::Relaxed) {
            return Err(PipelineError::Commit("rejected".to_owned()));
        }
        if request.test_only || request.composition.is_none() {
            return Ok(None);
        }
        Ok(Some(Fence::from_raw(
            self.next_fence.fetch_add(1, Ordering::Relaxed),
        )))
    }

    fn activate_legacy(&self) -> Result<(), PipelineError> {
        self.legacy_activations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// An importer that knows registered buffers and rejects everything else.
#[derive(Debug, Default)]
pub struct FakeImporter {
    buffers: Mutex<HashMap<BufferHandle, (u32, u32)>>,
}

impl FakeImporter {
    pub fn register(&self, handle: BufferHandle, width: u32, height: u32) {
        self.buffers.lock().insert(handle, (width, height));
    }
}

impl BufferImporter for FakeImporter {
    fn import(&self, handle: BufferHandle) -> Result<BufferInfo, PipelineError> {
        let (width, height) = self
            .buffers
            .lock()
            .get(&handle)
            .copied()
            .ok_or_else(|| PipelineError::Import(format!("{handle:?}")))?;
        Ok(BufferInfo {
            width,
            height,
            format: 0x3432_5258,
            planes: Vec::new(),
        })
    }
}

/// A composer with one display and handles to its fakes.
#[derive(Debug)]
pub struct Harness {
    pub composer: Composer,
    pub pipeline: Arc<FakePipeline>,
    pub importer: Arc<FakeImporter>,
}

pub const CLIENT_TARGET: BufferHandle = BufferHandle(0xc0);

impl Harness {
    pub fn new(pipeline: FakePipeline) -> Self {
        Self::with_settings(pipeline, Settings::default())
    }

    pub fn with_settings(pipeline: FakePipeline, settings: Settings) -> Self {
        let composer = Composer::new(settings);
        let pipeline = Arc::new(pipeline);
        let importer = Arc::new(FakeImporter::default());
        importer.register(CLIENT_TARGET, 1920, 1080);
        composer
            .add_display(
                DisplayHandle::PRIMARY,
                DisplayKind::Physical,
                Arc::clone(&pipeline) as Arc<dyn Pipeline>,
                Arc::clone(&importer) as Arc<dyn BufferImporter>,
                Box::new(GenericBackend),
            )
            .unwrap();
        Self {
            composer,
            pipeline,
            importer,
        }
    }
}

/// Settings with flattening turned off, so no background state changes
/// while a test inspects a display.
pub fn quiet_settings() -> Settings {
    Settings {
        flattening: FlatteningSettings {
            enabled: false,
            ..FlatteningSettings::default()
        },
        ..Settings::default()
    }
}

/// Adds a device-requested layer backed by a registered `width`×`height`
/// buffer covering the same area on screen.
pub fn add_device_layer(
    display: &mut Display,
    importer: &FakeImporter,
    buffer: u64,
    z_order: u32,
    (width, height): (u32, u32),
) -> LayerId {
    let handle = BufferHandle(buffer);
    importer.register(handle, width, height);
    let id = display.create_layer();
    let layer = display.layer_mut(id).unwrap();
    layer.set_composition_type(CompositionType::Device);
    layer.set_buffer(Some(handle), None);
    layer.set_display_frame(Frame::from_size(width, height));
    layer.set_z_order(z_order);
    id
}

/// Supplies the registered client target buffer.
pub fn set_client_target(display: &mut Display) {
    display
        .set_client_target(Some(CLIENT_TARGET), None, Dataspace::UNKNOWN, &[])
        .unwrap();
}

/// Polls `condition` until it holds or two seconds pass.
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
    condition()
}
