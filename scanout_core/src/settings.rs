// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime settings for the composer.
//!
//! Settings are plain data: they are parsed from TOML, validated once, and
//! handed to [`Composer::new`](crate::composer::Composer::new). Every field
//! has a default, so an empty document is a valid configuration.
//!
//! ```toml
//! [flattening]
//! enabled = true
//! countdown_vsyncs = 60
//!
//! [vsync]
//! fallback_period_ns = 16666666
//!
//! [headless]
//! width = 1024
//! height = 768
//! refresh_hz = 60.0
//! mm_width = 163
//! mm_height = 122
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML for [`Settings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Top-level composer settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Flattening policy.
    pub flattening: FlatteningSettings,
    /// Vsync cadence.
    pub vsync: VsyncSettings,
    /// Placeholder configuration used while no pipeline is attached.
    pub headless: HeadlessSettings,
}

/// Flattening policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlatteningSettings {
    /// Whether stable scenes are flattened at all.
    pub enabled: bool,
    /// Number of stable vsyncs before a flattening refresh is requested.
    pub countdown_vsyncs: u32,
}

impl Default for FlatteningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            countdown_vsyncs: 60,
        }
    }
}

/// Vsync cadence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VsyncSettings {
    /// Synthetic vsync period used when the active configuration has no
    /// refresh rate.
    pub fallback_period_ns: i64,
}

impl Default for VsyncSettings {
    fn default() -> Self {
        Self {
            fallback_period_ns: 16_666_666,
        }
    }
}

/// Placeholder mode synthesized for a headless display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadlessSettings {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Refresh rate in hertz.
    pub refresh_hz: f32,
    /// Physical width in millimetres.
    pub mm_width: u32,
    /// Physical height in millimetres.
    pub mm_height: u32,
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            refresh_hz: 60.0,
            mm_width: 163,
            mm_height: 122,
        }
    }
}

impl Settings {
    /// Parses and validates settings from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses, and validates a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.flattening.countdown_vsyncs == 0 {
            return Err(SettingsError::Invalid {
                field: "flattening.countdown_vsyncs",
                reason: "must be at least 1",
            });
        }
        if self.vsync.fallback_period_ns <= 0 {
            return Err(SettingsError::Invalid {
                field: "vsync.fallback_period_ns",
                reason: "must be positive",
            });
        }
        if self.headless.width == 0 || self.headless.height == 0 {
            return Err(SettingsError::Invalid {
                field: "headless",
                reason: "resolution must be non-zero",
            });
        }
        if !(self.headless.refresh_hz.is_finite() && self.headless.refresh_hz > 0.0) {
            return Err(SettingsError::Invalid {
                field: "headless.refresh_hz",
                reason: "must be a positive finite rate",
            });
        }
        Ok(())
    }
}
