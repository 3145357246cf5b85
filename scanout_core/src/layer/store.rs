// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer ownership, identifier issue, and change tracking.

use std::collections::BTreeMap;

use tracing::trace;

use super::{Layer, LayerId};
use crate::error::{Error, Result};

/// Owns every client layer of one display.
///
/// Identifiers come from a counter owned by the store, start at
/// [`LayerId::FIRST`], and are never reused. Any creation, destruction, or
/// mutable access marks the store dirty; a successful validation clears it.
#[derive(Debug)]
pub struct LayerStore {
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
    dirty: bool,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty store. A fresh store is dirty: nothing has been
    /// validated yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
            next_id: LayerId::FIRST.get(),
            dirty: true,
        }
    }

    /// Allocates a fresh identifier and a default layer.
    pub fn create(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, Layer::new());
        self.dirty = true;
        trace!(layer = id.get(), "layer created");
        id
    }

    /// Removes a layer.
    ///
    /// Destroying [`LayerId::RESERVED`] while the store is empty is a no-op,
    /// as some clients destroy layers before creating any.
    /// Every other unknown identifier is [`Error::BadLayer`].
    pub fn destroy(&mut self, id: LayerId) -> Result<()> {
        if self.layers.remove(&id).is_some() {
            self.dirty = true;
            trace!(layer = id.get(), "layer destroyed");
            return Ok(());
        }
        if self.layers.is_empty() && id == LayerId::RESERVED {
            return Ok(());
        }
        Err(Error::BadLayer)
    }

    /// Returns the layer for `id`.
    pub fn get(&self, id: LayerId) -> Result<&Layer> {
        self.layers.get(&id).ok_or(Error::BadLayer)
    }

    /// Returns the layer for `id` for modification, marking the store dirty.
    pub fn get_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        let layer = self.layers.get_mut(&id).ok_or(Error::BadLayer)?;
        self.dirty = true;
        Ok(layer)
    }

    /// Returns `true` if `id` names a live layer.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Number of live layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if there are no live layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterates layers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    /// Returns layer identifiers sorted by ascending z-order.
    ///
    /// Layers sharing a z value keep identifier order.
    #[must_use]
    pub fn ids_by_z(&self) -> Vec<LayerId> {
        let mut ids: Vec<LayerId> = self.layers.keys().copied().collect();
        ids.sort_by_key(|id| self.layers[id].z_order());
        ids
    }

    /// Returns `true` if the layer set changed since the last validation.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next present to re-derive the classification.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Mutable iteration for orchestrator bookkeeping. Does not mark dirty.
    pub(crate) fn iter_mut_untracked(&mut self) -> impl Iterator<Item = (LayerId, &mut Layer)> + '_ {
        self.layers.iter_mut().map(|(id, layer)| (*id, layer))
    }

    /// Mutable access for orchestrator bookkeeping. Does not mark dirty.
    pub(crate) fn get_mut_untracked(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }
}
