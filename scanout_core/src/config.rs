// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display configurations.
//!
//! The [`ConfigRegistry`] turns the modes a connector reports into numbered
//! configurations, groups them by resolution, disables the ones clients
//! should not pick, and tracks which one is preferred and which is active.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{Error, PipelineError, Result};
use crate::pipeline::ConnectorInfo;
use crate::settings::HeadlessSettings;

/// Identifies a configuration. Issued from 1 and never reused.
pub type ConfigId = u32;

/// Mode flags relevant to configuration selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModeFlags {
    /// The connector recommends this mode.
    pub preferred: bool,
    /// Interlaced scanout.
    pub interlaced: bool,
    /// Stereoscopic 3D layout.
    pub stereo_3d: bool,
}

/// One display timing mode as reported by the connector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayMode {
    /// Human-readable name, for example `1920x1080`.
    pub name: String,
    /// Active horizontal pixels.
    pub width: u32,
    /// Active vertical lines.
    pub height: u32,
    /// Vertical refresh in hertz.
    pub refresh_hz: f32,
    /// Selection flags.
    pub flags: ModeFlags,
}

impl DisplayMode {
    /// Vsync period in nanoseconds, `1e9 / refresh`. Zero when the refresh
    /// rate is unknown.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "period of any positive refresh rate fits in i64 nanoseconds"
    )]
    pub fn vsync_period_ns(&self) -> i64 {
        if self.refresh_hz > 0.0 {
            (1e9 / f64::from(self.refresh_hz)) as i64
        } else {
            0
        }
    }
}

/// A numbered configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    /// Configuration identifier.
    pub id: ConfigId,
    /// Configurations sharing a group switch without full reconfiguration.
    pub group_id: u32,
    /// The timing mode.
    pub mode: DisplayMode,
    /// Hidden from clients.
    pub disabled: bool,
}

/// Queryable per-configuration attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Horizontal pixels.
    Width,
    /// Vertical lines.
    Height,
    /// Vsync period in nanoseconds.
    VsyncPeriod,
    /// Horizontal dots per thousand inches.
    DpiX,
    /// Vertical dots per thousand inches.
    DpiY,
    /// Group identifier.
    ConfigGroup,
}

impl TryFrom<i32> for Attribute {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            1 => Ok(Self::Width),
            2 => Ok(Self::Height),
            3 => Ok(Self::VsyncPeriod),
            4 => Ok(Self::DpiX),
            5 => Ok(Self::DpiY),
            7 => Ok(Self::ConfigGroup),
            _ => Err(Error::BadConfig),
        }
    }
}

const MICROMETRES_PER_INCH: i64 = 25_400;

/// Configuration set of one display.
#[derive(Clone, Debug, Default)]
pub struct ConfigRegistry {
    configs: BTreeMap<ConfigId, DisplayConfig>,
    next_id: ConfigId,
    preferred: ConfigId,
    active: ConfigId,
    mm_width: u32,
    mm_height: u32,
}

impl ConfigRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds the configuration set from a connector description.
    ///
    /// Fails with [`PipelineError::Query`] when the connector reports no
    /// modes. The active configuration is reset to the preferred one.
    pub fn update(&mut self, connector: &ConnectorInfo) -> core::result::Result<(), PipelineError> {
        if connector.modes.is_empty() {
            return Err(PipelineError::Query(format!(
                "connector {} reports no modes",
                connector.name
            )));
        }

        self.configs.clear();
        self.preferred = 0;
        self.mm_width = connector.mm_width;
        self.mm_height = connector.mm_height;

        let mut next_group = 1;
        let mut preferred_group = 0;
        let mut first_id = 0;

        for mode in &connector.modes {
            let group_id = self
                .configs
                .values()
                .find(|c| c.mode.width == mode.width && c.mode.height == mode.height)
                .map(|c| c.group_id)
                .unwrap_or_else(|| {
                    next_group += 1;
                    next_group - 1
                });

            let disabled = mode.flags.stereo_3d;
            if disabled {
                info!(mode = %mode.name, "disabling stereoscopic 3D mode");
            }

            let id = self.next_id;
            self.next_id += 1;
            if first_id == 0 {
                first_id = id;
            }
            self.configs.insert(
                id,
                DisplayConfig {
                    id,
                    group_id,
                    mode: mode.clone(),
                    disabled,
                },
            );

            if mode.flags.preferred && self.preferred == 0 {
                self.preferred = id;
                preferred_group = group_id;
            }
        }

        if self.preferred == 0 {
            self.preferred = first_id;
            preferred_group = self.configs[&first_id].group_id;
        }

        for group in 1..next_group {
            self.prune_scan_types(group, group == preferred_group);
        }
        self.prune_close_refresh_rates();

        self.active = self.preferred;
        debug!(
            connector = %connector.name,
            configs = self.configs.len(),
            preferred = self.preferred,
            "configurations updated"
        );
        Ok(())
    }

    /// Within a group holding both interlaced and progressive modes, keep
    /// only the scan type of the preferred mode when it lives in the group,
    /// and progressive otherwise.
    fn prune_scan_types(&mut self, group: u32, holds_preferred: bool) {
        let members = || {
            self.configs
                .values()
                .filter(move |c| c.group_id == group && !c.disabled)
        };
        let has_interlaced = members().any(|c| c.mode.flags.interlaced);
        let has_progressive = members().any(|c| !c.mode.flags.interlaced);
        if !(has_interlaced && has_progressive) {
            return;
        }

        let keep_interlaced =
            holds_preferred && self.configs[&self.preferred].mode.flags.interlaced;
        for config in self.configs.values_mut() {
            if config.group_id != group || config.disabled {
                continue;
            }
            if config.mode.flags.interlaced != keep_interlaced {
                info!(group, mode = %config.mode.name, "disabling mode of the other scan type");
                config.disabled = true;
            }
        }
    }

    /// Within a group, a mode whose refresh rate is less than 1 Hz away from
    /// an earlier enabled mode is disabled.
    fn prune_close_refresh_rates(&mut self) {
        let ids: Vec<ConfigId> = self.configs.keys().copied().collect();
        for (i, first) in ids.iter().enumerate() {
            let Some(kept) = self.configs.get(first).filter(|c| !c.disabled).cloned() else {
                continue;
            };
            for other in &ids[i + 1..] {
                if let Some(config) = self.configs.get_mut(other) {
                    if !config.disabled
                        && config.group_id == kept.group_id
                        && (config.mode.refresh_hz - kept.mode.refresh_hz).abs() < 1.0
                    {
                        info!(
                            group = config.group_id,
                            mode = %config.mode.name,
                            close_to = %kept.mode.name,
                            "disabling mode with near-duplicate refresh rate"
                        );
                        config.disabled = true;
                    }
                }
            }
        }
    }

    /// Replaces the configuration set with a single placeholder mode.
    pub fn fill_headless(&mut self, headless: &HeadlessSettings) {
        self.configs.clear();
        self.mm_width = headless.mm_width;
        self.mm_height = headless.mm_height;

        let id = self.next_id;
        self.next_id += 1;
        self.configs.insert(
            id,
            DisplayConfig {
                id,
                group_id: 1,
                mode: DisplayMode {
                    name: format!("{}x{}", headless.width, headless.height),
                    width: headless.width,
                    height: headless.height,
                    refresh_hz: headless.refresh_hz,
                    flags: ModeFlags {
                        preferred: true,
                        ..ModeFlags::default()
                    },
                },
                disabled: false,
            },
        );
        self.preferred = id;
        self.active = id;
    }

    /// Looks up a configuration.
    pub fn get(&self, id: ConfigId) -> Result<&DisplayConfig> {
        self.configs.get(&id).ok_or(Error::BadConfig)
    }

    /// Identifiers of the configurations offered to clients.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<ConfigId> {
        self.configs
            .values()
            .filter(|c| !c.disabled)
            .map(|c| c.id)
            .collect()
    }

    /// The preferred configuration chosen by the last update.
    #[must_use]
    pub fn preferred_id(&self) -> ConfigId {
        self.preferred
    }

    /// The active configuration, [`Error::BadConfig`] if it no longer exists.
    pub fn active_id(&self) -> Result<ConfigId> {
        if self.configs.contains_key(&self.active) {
            Ok(self.active)
        } else {
            Err(Error::BadConfig)
        }
    }

    /// The active configuration's mode.
    pub fn active_mode(&self) -> Result<&DisplayMode> {
        self.get(self.active).map(|c| &c.mode)
    }

    /// Marks `id` active and returns its mode.
    pub fn set_active(&mut self, id: ConfigId) -> Result<&DisplayMode> {
        let config = self.configs.get(&id).ok_or(Error::BadConfig)?;
        self.active = id;
        Ok(&config.mode)
    }

    /// Physical size in millimetres.
    #[must_use]
    pub fn physical_size_mm(&self) -> (u32, u32) {
        (self.mm_width, self.mm_height)
    }

    /// Reads one attribute of a configuration.
    pub fn attribute(&self, id: ConfigId, attribute: Attribute) -> Result<i32> {
        let mode = &self.get(id)?.mode;
        let value = match attribute {
            Attribute::Width => i64::from(mode.width),
            Attribute::Height => i64::from(mode.height),
            Attribute::VsyncPeriod => mode.vsync_period_ns(),
            Attribute::DpiX => dpi(mode.width, self.mm_width),
            Attribute::DpiY => dpi(mode.height, self.mm_height),
            Attribute::ConfigGroup => i64::from(self.get(id)?.group_id),
        };
        Ok(i32::try_from(value).unwrap_or(i32::MAX))
    }
}

/// Dots per thousand inches, or −1 when the physical size is unknown.
fn dpi(pixels: u32, millimetres: u32) -> i64 {
    if millimetres == 0 {
        return -1;
    }
    i64::from(pixels) * MICROMETRES_PER_INCH / i64::from(millimetres)
}
