// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-display composition orchestration.
//!
//! `scanout_core` sits between a scene-graph client that submits layers and
//! a scanout pipeline that can show some of them directly on hardware
//! planes. For every frame it decides which layers the hardware composites
//! ("device") and which the client must flatten into one buffer ("client"),
//! checks that split against the hardware with a test-only commit, and then
//! commits it atomically.
//!
//! # Architecture
//!
//! ```text
//!   client ──► Composer::lock() ──► Display
//!                                      │
//!            set_* ──► LayerStore      │ validate()
//!                                      ▼
//!                     Backend::classify() ──► test-only commit
//!                                      │
//!                                      │ present()
//!                                      ▼
//!                     Composition ──► AtomicCommitExecutor ──► Pipeline
//!                                                                 │
//!                     present fence, release fences ◄─────────────┘
//!
//!   VSyncScheduler ──► vsync callback
//!                 └──► FlatteningController ──► refresh callback
//! ```
//!
//! **[`composer`]**: The process-level device. Owns every display behind one
//! main lock and routes notifier events to the client callbacks.
//!
//! **[`display`]**: The validate/present protocol and every per-display
//! query and mutator.
//!
//! **[`layer`]**: Client layers, their attributes, and the store that
//! issues their identifiers and tracks changes.
//!
//! **[`config`]**: Display configurations derived from connector modes.
//!
//! **[`backend`]**: The device/client split. [`GenericBackend`](backend::GenericBackend)
//! is the default strategy.
//!
//! **[`pipeline`]**, **[`buffer`]**: The collaborator traits a platform
//! implements: connector, planes, and commits; buffer import.
//!
//! **[`commit`]**, **[`composition`]**: What gets committed and how.
//!
//! **[`vsync`]**, **[`flattening`]**: Background notifiers and the
//! flattening countdown they drive.
//!
//! **[`stats`]**, **[`report`]**: Frame counters and the diagnostics
//! snapshot rendered by `scanout_debug`.
//!
//! **[`settings`]**: Tunables loaded from TOML.

pub mod backend;
pub mod buffer;
pub mod color;
pub mod commit;
pub mod composer;
pub mod composition;
pub mod config;
pub mod display;
pub mod error;
pub mod fence;
pub mod flattening;
pub mod geometry;
pub mod layer;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod stats;
pub mod time;
pub mod vsync;

pub use error::{Error, PipelineError, Result};
