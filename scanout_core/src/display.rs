// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-display orchestrator.
//!
//! A [`Display`] owns the layers the client submits for one output, its
//! configuration set, its vsync notifiers, and its statistics. Each frame
//! goes through two phases:
//!
//! 1. [`validate`](Display::validate) orders layers by z, asks the
//!    [`Backend`] which of them hardware can scan out, and checks the result
//!    with a test-only commit. Layers that changed type are reported back.
//! 2. [`present`](Display::present) builds the final [`Composition`]: every
//!    device layer in z order plus, if anything is client composited, the
//!    client target at the lowest client z. It is committed atomically and
//!    the present fence returned.
//!
//! Any layer mutation between the two phases invalidates the
//! classification; present then recomputes it.
//!
//! Displays are reached through [`Composer::lock`](crate::composer::Composer::lock),
//! which holds the process-wide main lock for the duration of the call.

use std::sync::Arc;

use kurbo::Rect;
use tracing::{debug, trace, warn};

use crate::backend::{Backend, ClassifyContext, Placement};
use crate::buffer::{BufferHandle, BufferImporter};
use crate::color::{
    ColorMatrix, ColorMode, ColorTransform, ColorTransformHint, ContentType, PowerMode,
    RenderIntent,
};
use crate::commit::{AtomicCommitExecutor, CommitRequest};
use crate::composition::{Composition, CompositionLayer, LayerSource};
use crate::config::{Attribute, ConfigId, ConfigRegistry, DisplayMode};
use crate::error::{Error, Result};
use crate::fence::Fence;
use crate::flattening::{FlatteningController, FlatteningState, ValidateAction, VsyncOutcome};
use crate::geometry::Frame;
use crate::layer::{BlendMode, CompositionType, Dataspace, Layer, LayerId, LayerStore};
use crate::output::{ConnectionType, DisplayHandle, DisplayKind};
use crate::pipeline::{AvailablePlanes, ConnectorInfo, ConnectorKind, Pipeline};
use crate::report::DisplayReport;
use crate::settings::Settings;
use crate::stats::{Stats, StatsTracker};
use crate::vsync::VSyncScheduler;

/// Result of [`Display::validate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValidateOutcome {
    /// Layers whose validated type differs from the requested one.
    pub changed_types: u32,
    /// Layers with pending requests. Always zero.
    pub requests: u32,
}

/// Requests the display makes of the client after validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayRequests {
    /// Display-wide request flags.
    pub display_flags: u32,
    /// Per-layer request flags.
    pub layers: Vec<(LayerId, u32)>,
}

/// HDR support of a display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HdrCapabilities {
    /// Supported HDR types.
    pub types: Vec<i32>,
    /// Peak luminance in nits.
    pub max_luminance: f32,
    /// Maximum frame-average luminance in nits.
    pub max_average_luminance: f32,
    /// Minimum luminance in nits.
    pub min_luminance: f32,
}

/// EDID-style identification of the attached sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentificationData {
    /// Connector port.
    pub port: u8,
    /// Raw identification blob.
    pub data: Vec<u8>,
}

/// Collaborators a display is built from.
pub struct DisplayParts {
    /// Scanout pipeline.
    pub pipeline: Arc<dyn Pipeline>,
    /// Buffer importer.
    pub importer: Arc<dyn BufferImporter>,
    /// Device/client split strategy.
    pub backend: Box<dyn Backend>,
}

impl core::fmt::Debug for DisplayParts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayParts").finish_non_exhaustive()
    }
}

/// One output and everything composited onto it.
pub struct Display {
    handle: DisplayHandle,
    kind: DisplayKind,
    executor: AtomicCommitExecutor,
    importer: Arc<dyn BufferImporter>,
    backend: Box<dyn Backend>,
    connector: ConnectorInfo,

    // -- Frame state --
    layers: LayerStore,
    client_target: Layer,
    staged_mode: Option<DisplayMode>,
    frame_no: u64,

    // -- Configuration --
    configs: ConfigRegistry,
    settings: Settings,
    color_mode: ColorMode,
    color_transform: ColorTransform,
    power_mode: Option<PowerMode>,

    // -- Background --
    flattening: FlatteningController,
    notifiers: VSyncScheduler,
    stats: StatsTracker,
}

impl core::fmt::Debug for Display {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Display")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("connector", &self.connector.name)
            .field("layers", &self.layers.len())
            .field("flattening", &self.flattening.state())
            .finish_non_exhaustive()
    }
}

impl Display {
    /// Creates a display, queries its connector, and activates the preferred
    /// configuration.
    ///
    /// Fails with [`Error::BadDisplay`] when the connector cannot be queried
    /// or, for a connected display, reports no modes.
    pub fn new(
        handle: DisplayHandle,
        kind: DisplayKind,
        parts: DisplayParts,
        settings: &Settings,
        notifiers: VSyncScheduler,
    ) -> Result<Self> {
        let connector = parts.pipeline.connector().map_err(|err| {
            warn!(display = %handle, %err, "failed to query connector");
            Error::from(err)
        })?;
        let mut client_target = Layer::new();
        client_target.set_blend_mode(BlendMode::Premultiplied);

        let mut this = Self {
            handle,
            kind,
            executor: AtomicCommitExecutor::new(parts.pipeline, handle),
            importer: parts.importer,
            backend: parts.backend,
            connector,
            layers: LayerStore::new(),
            client_target,
            staged_mode: None,
            frame_no: 0,
            configs: ConfigRegistry::new(),
            settings: settings.clone(),
            color_mode: ColorMode::Native,
            color_transform: ColorTransform::default(),
            power_mode: None,
            flattening: FlatteningController::new(&settings.flattening),
            notifiers,
            stats: StatsTracker::new(),
        };
        this.choose_preferred_config()?;
        let headless = this.is_headless();
        debug!(
            display = %handle,
            connector = %this.connector.name,
            headless,
            "display created"
        );
        Ok(this)
    }

    fn choose_preferred_config(&mut self) -> Result<()> {
        if self.is_headless() {
            self.configs.fill_headless(&self.settings.headless);
        } else {
            self.configs.update(&self.connector)?;
        }
        self.set_active_config(self.configs.preferred_id())
    }

    /// Display handle.
    #[must_use]
    pub fn handle(&self) -> DisplayHandle {
        self.handle
    }

    /// Headless: the primary display with nothing plugged in. It keeps a
    /// placeholder configuration and accepts every frame without scanning
    /// anything out.
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.handle.is_primary() && !self.connector.connected
    }

    /// Returns `true` when a sink is attached or the display is headless.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connector.connected || self.is_headless()
    }

    // -- Layers --

    /// Creates a layer.
    pub fn create_layer(&mut self) -> LayerId {
        self.layers.create()
    }

    /// Destroys a layer. See [`LayerStore::destroy`].
    pub fn destroy_layer(&mut self, id: LayerId) -> Result<()> {
        self.layers.destroy(id)
    }

    /// Returns a layer.
    pub fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers.get(id)
    }

    /// Returns a layer for modification. Invalidates the last validation.
    pub fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers.get_mut(id)
    }

    /// All client layers.
    #[must_use]
    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    /// The client target layer.
    #[must_use]
    pub fn client_target(&self) -> &Layer {
        &self.client_target
    }

    /// Supplies the buffer the client rendered its layers into.
    ///
    /// The source crop follows the buffer size. An import failure here is
    /// logged and tolerated; it surfaces again at present time.
    pub fn set_client_target(
        &mut self,
        buffer: Option<BufferHandle>,
        acquire_fence: Option<Fence>,
        dataspace: Dataspace,
        _damage: &[Frame],
    ) -> Result<()> {
        self.client_target.set_buffer(buffer, acquire_fence);
        self.client_target.set_dataspace(dataspace);
        let Some(handle) = buffer else {
            return Ok(());
        };
        match self.importer.import(handle) {
            Ok(info) => self.client_target.set_source_crop(Rect::new(
                0.0,
                0.0,
                f64::from(info.width),
                f64::from(info.height),
            )),
            Err(err) => debug!(display = %self.handle, %err, "client target not importable"),
        }
        Ok(())
    }

    // -- Validate / present --

    fn classify(&self, ids: &[LayerId]) -> Vec<Placement> {
        let layers: Vec<&Layer> = ids.iter().filter_map(|id| self.layers.get(*id).ok()).collect();
        let planes = AvailablePlanes::from_planes(&self.executor.pipeline().planes());
        let ctx = ClassifyContext {
            available_planes: planes.len(),
            color_transform: self.color_transform.hint,
            importer: &*self.importer,
        };
        let mut placements = self.backend.classify(&layers, &ctx);
        placements.resize(ids.len(), Placement::Client);
        placements
    }

    fn mark_validated(&mut self, ids: &[LayerId], placements: &[Placement]) {
        for (id, placement) in ids.iter().zip(placements) {
            if let Some(layer) = self.layers.get_mut_untracked(*id) {
                layer.set_validated_type(placement.composition_type());
            }
        }
    }

    fn pixel_ops(&self, ids: &[LayerId], placements: &[Placement], client_only: bool) -> u64 {
        ids.iter()
            .zip(placements)
            .filter(|(_, placement)| !client_only || **placement == Placement::Client)
            .filter_map(|(id, _)| self.layers.get(*id).ok())
            .map(|layer| layer.display_frame().area())
            .fold(0, u64::saturating_add)
    }

    /// Classifies every layer for the next present.
    ///
    /// Performs at most a test-only commit; nothing reaches the screen.
    pub fn validate(&mut self) -> Result<ValidateOutcome> {
        if self.is_headless() {
            return Ok(ValidateOutcome::default());
        }

        let ids = self.layers.ids_by_z();
        let all_client = vec![Placement::Client; ids.len()];

        let placements = match self.flattening.on_validate(ids.len() <= 1) {
            ValidateAction::Flatten => {
                self.stats.total_mut().frames_flattened += 1;
                all_client
            }
            action => {
                if action == ValidateAction::StartCountdown {
                    self.notifiers.set_flattening_enabled(true);
                }
                let placements = self.classify(&ids);
                self.mark_validated(&ids, &placements);
                let any_device = placements.contains(&Placement::Device);
                if any_device && self.create_composition(true).is_err() {
                    self.stats.total_mut().failed_kms_validate += 1;
                    all_client
                } else {
                    placements
                }
            }
        };
        self.mark_validated(&ids, &placements);

        let gpu = self.pixel_ops(&ids, &placements, true);
        let total = self.pixel_ops(&ids, &placements, false);
        self.stats.total_mut().record_pixel_ops(gpu, total);

        self.layers.clear_dirty();

        let changed = self.layers.iter().filter(|(_, l)| l.type_changed()).count();
        trace!(display = %self.handle, layers = ids.len(), changed, "validated");
        Ok(ValidateOutcome {
            changed_types: u32::try_from(changed).unwrap_or(u32::MAX),
            requests: 0,
        })
    }

    /// Layers the last validation moved to another type, with that type.
    ///
    /// A layer drops out once the client requests a new type for it or the
    /// changes are accepted.
    #[must_use]
    pub fn changed_composition_types(&self) -> Vec<(LayerId, CompositionType)> {
        if self.is_headless() {
            return Vec::new();
        }
        self.layers
            .iter()
            .filter(|(_, layer)| layer.type_changed())
            .map(|(id, layer)| (id, layer.validated_type()))
            .collect()
    }

    /// Display and layer requests. There are none.
    #[must_use]
    pub fn display_requests(&self) -> DisplayRequests {
        DisplayRequests::default()
    }

    /// Adopts every changed type reported by the last validation as the
    /// requested type.
    pub fn accept_changes(&mut self) {
        for (_, layer) in self.layers.iter_mut_untracked() {
            layer.accept_type_change();
        }
    }

    /// Commits the validated frame and returns its present fence.
    ///
    /// `Ok(None)` when there was nothing to show or the display is headless.
    pub fn present(&mut self) -> Result<Option<Fence>> {
        if self.is_headless() {
            return Ok(None);
        }
        self.stats.total_mut().total_frames += 1;

        if self.layers.is_dirty() {
            trace!(display = %self.handle, "layers changed since validate, reclassifying");
            let ids = self.layers.ids_by_z();
            let placements = self.classify(&ids);
            self.mark_validated(&ids, &placements);
        }

        match self.create_composition(false) {
            Ok(fence) => {
                self.frame_no += 1;
                Ok(fence)
            }
            Err(Error::BadLayer) => Ok(None),
            Err(err) => {
                self.stats.total_mut().failed_kms_present += 1;
                Err(err)
            }
        }
    }

    /// Builds the composition from validated types and commits it.
    fn create_composition(&mut self, test_only: bool) -> Result<Option<Fence>> {
        let mut entries: Vec<(u32, LayerSource)> = Vec::new();
        let mut client_z: Option<u32> = None;
        for (id, layer) in self.layers.iter() {
            match layer.validated_type() {
                CompositionType::Device => entries.push((layer.z_order(), LayerSource::Layer(id))),
                CompositionType::Client => {
                    let z = layer.z_order();
                    client_z = Some(client_z.map_or(z, |current| current.min(z)));
                }
                _ => {}
            }
        }
        if let Some(z) = client_z {
            entries.push((z, LayerSource::ClientTarget));
        }
        if entries.is_empty() {
            return Err(Error::BadLayer);
        }
        entries.sort_by_key(|(z, _)| *z);

        let mut composition_layers = Vec::with_capacity(entries.len());
        for (z_order, source) in entries {
            let layer = match source {
                LayerSource::Layer(id) => self.layers.get_mut_untracked(id),
                LayerSource::ClientTarget => Some(&mut self.client_target),
            }
            .ok_or(Error::BadLayer)?;
            let handle = layer.buffer().ok_or(Error::NoResources)?;
            let buffer = self.importer.import(handle).map_err(|err| {
                debug!(display = %self.handle, ?source, %err, "failed to import layer");
                Error::from(err)
            })?;
            let acquire_fence = if test_only {
                layer.dup_acquire_fence()
            } else {
                layer.take_acquire_fence()
            };
            let dataspace = layer.dataspace();
            composition_layers.push(CompositionLayer {
                source,
                z_order,
                buffer,
                acquire_fence,
                source_crop: layer.source_crop(),
                display_frame: layer.display_frame(),
                alpha: layer.plane_alpha_u16(),
                blend: layer.blend_mode(),
                transform: layer.transform(),
                color_space: dataspace.color_space(),
                sample_range: dataspace.sample_range(),
            });
        }

        let mut composition = Composition::new(composition_layers);
        let planes = AvailablePlanes::from_planes(&self.executor.pipeline().planes());
        if planes.primary.is_empty() {
            debug!(display = %self.handle, "no primary plane available");
            return Err(Error::BadConfig);
        }
        composition.planes = self
            .executor
            .pipeline()
            .plan_placement(&composition.layers, &planes)
            .map_err(|err| {
                debug!(display = %self.handle, %err, "failed to plan the composition");
                Error::BadConfig
            })?;

        let device_layers: Vec<LayerId> = composition.device_layers().collect();
        let request = if test_only {
            CommitRequest::test(composition, self.staged_mode.clone())
        } else {
            CommitRequest::frame(composition, self.staged_mode.clone())
        };
        let fence = self.executor.execute(request)?;

        if !test_only {
            self.staged_mode = None;
            if let Some(fence) = &fence {
                for id in device_layers {
                    if let Some(layer) = self.layers.get_mut_untracked(id) {
                        layer.set_release_fence(fence.dup());
                    }
                }
            }
        }
        Ok(fence)
    }

    /// Hands out pending release fences. Each fence is returned once.
    pub fn release_fences(&mut self) -> Vec<(LayerId, Fence)> {
        self.layers
            .iter_mut_untracked()
            .filter_map(|(id, layer)| layer.take_release_fence().map(|fence| (id, fence)))
            .collect()
    }

    /// The mode change waiting for the next successful present.
    #[must_use]
    pub fn staged_mode(&self) -> Option<&DisplayMode> {
        self.staged_mode.as_ref()
    }

    /// Successful presents so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_no
    }

    // -- Configurations --

    /// Configurations offered to the client.
    #[must_use]
    pub fn display_configs(&self) -> Vec<ConfigId> {
        self.configs.enabled_ids()
    }

    /// Reads an attribute of a configuration.
    pub fn attribute(&self, config: ConfigId, attribute: Attribute) -> Result<i32> {
        self.configs.attribute(config, attribute)
    }

    /// The active configuration.
    pub fn active_config(&self) -> Result<ConfigId> {
        self.configs.active_id()
    }

    /// The preferred configuration.
    #[must_use]
    pub fn preferred_config(&self) -> ConfigId {
        self.configs.preferred_id()
    }

    /// Activates `config` with the next present, and resizes the client
    /// target to the new mode.
    pub fn set_active_config(&mut self, config: ConfigId) -> Result<()> {
        let mode = self.configs.set_active(config).cloned().inspect_err(|_| {
            debug!(display = %self.handle, config, "unknown configuration");
        })?;
        self.client_target
            .set_display_frame(Frame::from_size(mode.width, mode.height));
        self.notifiers.set_period_ns(mode.vsync_period_ns());
        self.staged_mode = Some(mode);
        Ok(())
    }

    /// Seamless configuration changes are not supported.
    pub fn set_active_config_with_constraints(&mut self, _config: ConfigId) -> Result<()> {
        Err(Error::BadConfig)
    }

    /// Vsync period of the active configuration in nanoseconds.
    pub fn vsync_period(&self) -> Result<i32> {
        self.configs
            .attribute(self.configs.active_id()?, Attribute::VsyncPeriod)
    }

    /// Effective vsync period used by the notifiers.
    #[must_use]
    pub fn vsync_period_ns(&self) -> i64 {
        self.notifiers.period_ns()
    }

    // -- Identity and capabilities --

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        if self.is_headless() {
            "null-display".to_owned()
        } else {
            format!("display-{}", self.connector.id)
        }
    }

    /// Display class.
    #[must_use]
    pub fn display_type(&self) -> DisplayKind {
        self.kind
    }

    /// Connection type. A headless primary display reports internal.
    pub fn connection_type(&self) -> Result<ConnectionType> {
        if self.is_headless() || self.connector.kind == ConnectorKind::Internal {
            return Ok(ConnectionType::Internal);
        }
        match self.connector.kind {
            ConnectorKind::External => Ok(ConnectionType::External),
            _ => Err(Error::BadConfig),
        }
    }

    /// EDID of the attached sink. Empty for a headless display.
    pub fn identification_data(&self) -> Result<IdentificationData> {
        if self.is_headless() {
            return Ok(IdentificationData::default());
        }
        let Some(edid) = &self.connector.edid else {
            debug!(display = %self.handle, "no EDID available");
            return Err(Error::Unsupported);
        };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "port numbers are the low byte of the connector id"
        )]
        let port = self.connector.id as u8;
        Ok(IdentificationData {
            port,
            data: edid.clone(),
        })
    }

    /// Optional display capabilities. There are none.
    #[must_use]
    pub fn capabilities(&self) -> Vec<u32> {
        Vec::new()
    }

    /// Brightness control is not supported.
    #[must_use]
    pub fn brightness_support(&self) -> bool {
        false
    }

    /// Brightness control is not supported.
    pub fn set_display_brightness(&mut self, _brightness: f32) -> Result<()> {
        Err(Error::Unsupported)
    }

    /// Doze is not supported.
    #[must_use]
    pub fn doze_support(&self) -> bool {
        false
    }

    /// No HDR support.
    #[must_use]
    pub fn hdr_capabilities(&self) -> HdrCapabilities {
        HdrCapabilities::default()
    }

    /// Checks whether a client target of the given shape can be scanned out.
    pub fn client_target_support(
        &self,
        width: u32,
        height: u32,
        _format: u32,
        dataspace: Dataspace,
    ) -> Result<()> {
        if self.is_headless() {
            return Ok(());
        }
        if !self.executor.pipeline().resolution_limits().contains(width, height) {
            return Err(Error::Unsupported);
        }
        if dataspace != Dataspace::UNKNOWN {
            return Err(Error::Unsupported);
        }
        Ok(())
    }

    // -- Colour --

    /// Supported colour modes.
    #[must_use]
    pub fn color_modes(&self) -> Vec<ColorMode> {
        vec![ColorMode::Native]
    }

    /// Current colour mode.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Sets the colour mode. Only native is implemented.
    pub fn set_color_mode(&mut self, mode: ColorMode) -> Result<()> {
        if mode != ColorMode::Native {
            return Err(Error::Unsupported);
        }
        self.color_mode = mode;
        Ok(())
    }

    /// Render intents of `mode`.
    pub fn render_intents(&self, mode: ColorMode) -> Result<Vec<RenderIntent>> {
        if mode != ColorMode::Native {
            return Err(Error::BadParameter);
        }
        Ok(vec![RenderIntent::Colorimetric])
    }

    /// Sets the colour mode together with a render intent.
    pub fn set_color_mode_with_intent(&mut self, mode: ColorMode, intent: RenderIntent) -> Result<()> {
        if mode != ColorMode::Native || intent != RenderIntent::Colorimetric {
            return Err(Error::Unsupported);
        }
        self.color_mode = mode;
        Ok(())
    }

    /// Sets the colour transform. An arbitrary-matrix hint needs a matrix,
    /// which is copied.
    pub fn set_color_transform(
        &mut self,
        matrix: Option<&ColorMatrix>,
        hint: ColorTransformHint,
    ) -> Result<()> {
        if hint == ColorTransformHint::ArbitraryMatrix {
            let matrix = matrix.ok_or(Error::BadParameter)?;
            self.color_transform.matrix = *matrix;
        }
        self.color_transform.hint = hint;
        Ok(())
    }

    /// Current colour transform.
    #[must_use]
    pub fn color_transform(&self) -> &ColorTransform {
        &self.color_transform
    }

    /// Virtual-display output buffers are not supported.
    pub fn set_output_buffer(&mut self, _buffer: BufferHandle, _release_fence: Option<Fence>) -> Result<()> {
        Err(Error::Unsupported)
    }

    // -- Power, vsync, content --

    /// Changes the power mode.
    ///
    /// `Off` commits a deactivation. `On` goes through the legacy
    /// power-control path instead of an atomic activation; the next present
    /// activates the pipeline with a real composition.
    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<()> {
        match mode {
            PowerMode::Doze | PowerMode::DozeSuspend => return Err(Error::Unsupported),
            _ if self.is_headless() => {}
            PowerMode::Off => {
                self.executor.execute(CommitRequest::deactivate())?;
            }
            PowerMode::On => self.executor.activate_legacy()?,
        }
        self.power_mode = Some(mode);
        Ok(())
    }

    /// The last power mode set successfully, if any.
    #[must_use]
    pub fn power_mode(&self) -> Option<PowerMode> {
        self.power_mode
    }

    /// Starts or stops client vsync delivery.
    pub fn set_vsync_enabled(&mut self, enabled: bool) {
        self.notifiers.set_vsync_enabled(enabled);
    }

    /// Returns `true` while client vsyncs are delivered.
    #[must_use]
    pub fn vsync_enabled(&self) -> bool {
        self.notifiers.vsync_enabled()
    }

    /// Supported content types. Only the implicit `None`.
    #[must_use]
    pub fn supported_content_types(&self) -> Vec<ContentType> {
        Vec::new()
    }

    /// Sets the content type. Only [`ContentType::None`] is accepted.
    pub fn set_content_type(&mut self, content_type: ContentType) -> Result<()> {
        if content_type == ContentType::None {
            Ok(())
        } else {
            Err(Error::Unsupported)
        }
    }

    /// Auto low-latency mode is not supported.
    pub fn set_auto_low_latency_mode(&mut self, _on: bool) -> Result<()> {
        Err(Error::Unsupported)
    }

    // -- Flattening --

    /// Turns flattening on or off.
    pub fn set_flattening_enabled(&mut self, enabled: bool) {
        self.flattening.set_enabled(enabled);
        if !enabled {
            self.notifiers.set_flattening_enabled(false);
        }
    }

    /// Current flattening state.
    #[must_use]
    pub fn flattening_state(&self) -> FlatteningState {
        self.flattening.state()
    }

    /// Advances flattening on one notifier vsync. Returns `true` when the
    /// client should be asked to refresh.
    pub(crate) fn on_flattening_vsync(&mut self) -> bool {
        match self.flattening.on_vsync(self.layers.is_dirty()) {
            VsyncOutcome::Continue => false,
            VsyncOutcome::Stop => {
                self.notifiers.set_flattening_enabled(false);
                false
            }
            VsyncOutcome::RefreshRequested => {
                self.notifiers.set_flattening_enabled(false);
                debug!(display = %self.handle, "requesting flattening refresh");
                true
            }
        }
    }

    // -- Hotplug --

    /// Re-reads the connector after a hotplug event and re-seeds the
    /// configuration set.
    ///
    /// Returns whether the display should be reported as connected. A
    /// headless primary display always is.
    pub(crate) fn refresh_connection(&mut self) -> Result<bool> {
        let was_headless = self.is_headless();
        self.connector = self.executor.pipeline().connector()?;
        if !self.connector.connected && !self.is_headless() {
            if let Err(err) = self.executor.execute(CommitRequest::clear()) {
                debug!(display = %self.handle, %err, "failed to clear composition on unplug");
            }
        }
        if self.is_connected() {
            self.choose_preferred_config()?;
        }
        if was_headless != self.is_headless() {
            debug!(display = %self.handle, headless = self.is_headless(), "headless state changed");
        }
        Ok(self.is_connected())
    }

    // -- Diagnostics --

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        self.stats.total()
    }

    /// Snapshot for diagnostics. Starts a new statistics window.
    pub fn report(&mut self) -> DisplayReport {
        DisplayReport {
            handle: self.handle,
            connector: if self.is_headless() {
                "NULL-DISPLAY".to_owned()
            } else {
                self.connector.name.clone()
            },
            flattening: self.flattening.state(),
            totals: *self.stats.total(),
            delta: self.stats.take_delta(),
        }
    }
}
