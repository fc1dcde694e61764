//! Mutually exclusive basemap selection.
//!
//! Every basemap is a raster layer on the map surface. Exactly one of them is
//! `visible` at any time; selecting one hides all the others in the same
//! pass, so any basemap can be reached from any other in a single transition.

use std::sync::Arc;

use itertools::Itertools;

use crate::identifiers::LayerId;
use crate::style::Visibility;
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasemapEntry {
    pub display_name: Arc<str>,
    pub layer_id: LayerId,
}

impl BasemapEntry {
    pub fn new(display_name: impl AsRef<str>, layer_id: impl Into<LayerId>) -> Self {
        Self {
            display_name: display_name.as_ref().into(),
            layer_id: layer_id.into(),
        }
    }
}

/// Position of an entry in a [`BasemapSwitcher`]. Only the switcher hands
/// these out, so a handle always names a registered basemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasemapHandle(usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasemapError {
    #[error("no basemaps configured")]
    Empty,

    #[error("basemap layer registered twice: {0}")]
    Duplicate(LayerId),

    #[error("default basemap is not registered: {0}")]
    UnknownDefault(LayerId),

    #[error("unknown basemap layer: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone)]
pub struct BasemapSwitcher {
    entries: Vec<BasemapEntry>,
    selected: BasemapHandle,
}

impl BasemapSwitcher {
    pub fn new(entries: Vec<BasemapEntry>, default_layer: &LayerId) -> Result<Self, BasemapError> {
        if entries.is_empty() {
            return Err(BasemapError::Empty);
        }
        if let Some(duplicate) = entries.iter().map(|entry| &entry.layer_id).duplicates().next() {
            return Err(BasemapError::Duplicate(duplicate.clone()));
        }
        let selected = entries
            .iter()
            .position(|entry| &entry.layer_id == default_layer)
            .map(BasemapHandle)
            .ok_or_else(|| BasemapError::UnknownDefault(default_layer.clone()))?;

        Ok(Self { entries, selected })
    }

    pub fn entries(&self) -> &[BasemapEntry] {
        &self.entries
    }

    pub fn handles(&self) -> impl Iterator<Item = (BasemapHandle, &BasemapEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (BasemapHandle(index), entry))
    }

    pub fn handle_for(&self, layer_id: &str) -> Option<BasemapHandle> {
        self.entries
            .iter()
            .position(|entry| entry.layer_id == *layer_id)
            .map(BasemapHandle)
    }

    pub fn entry(&self, handle: BasemapHandle) -> Option<&BasemapEntry> {
        self.entries.get(handle.0)
    }

    pub fn selected(&self) -> BasemapHandle {
        self.selected
    }

    pub fn selected_entry(&self) -> &BasemapEntry {
        &self.entries[self.selected.0]
    }

    /// Pushes the current selection to the surface. Called once the surface
    /// has loaded so exactly one basemap is visible before the first user
    /// action.
    pub fn initialize<S: MapSurface + ?Sized>(&self, surface: &mut S) {
        self.apply(surface);
    }

    pub fn select_basemap<S: MapSurface + ?Sized>(&mut self, surface: &mut S, target: BasemapHandle) {
        let Some(entry) = self.entries.get(target.0) else {
            // handle from another switcher; leave the current selection alone
            tracing::error!(index = target.0, "basemap handle out of range");
            return;
        };
        tracing::debug!(
            from = %self.selected_entry().layer_id,
            to = %entry.layer_id,
            "switching basemap"
        );
        self.selected = target;
        self.apply(surface);
    }

    /// String entry point for callers outside the control table. An unknown
    /// id changes nothing.
    pub fn select_by_layer_id<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        layer_id: &str,
    ) -> Result<(), BasemapError> {
        let handle = self
            .handle_for(layer_id)
            .ok_or_else(|| BasemapError::Unknown(layer_id.to_owned()))?;
        self.select_basemap(surface, handle);
        Ok(())
    }

    fn apply<S: MapSurface + ?Sized>(&self, surface: &mut S) {
        for (handle, entry) in self.handles() {
            let visibility = if handle == self.selected {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            surface.set_layer_visibility(&entry.layer_id, visibility);
        }
    }
}
