//! Event dispatch for the protected-areas map.
//!
//! [`ParkMap`] owns the map surface and both interactive components. The host
//! forwards the events listed by [`ParkMap::subscriptions`] and button presses
//! from the basemap panel; everything runs to completion inside the call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::basemap::{BasemapEntry, BasemapError, BasemapHandle, BasemapSwitcher};
use crate::identifiers::{ControlId, LayerId};
use crate::inspector::{ClickEvent, FeatureInspector};
use crate::style::{MapConfig, StyleError};
use crate::surface::{MapSurface, Popup};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unknown control: {0}")]
    UnknownControl(ControlId),

    #[error(transparent)]
    Basemap(#[from] BasemapError),

    #[error(transparent)]
    Style(#[from] StyleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MapEventKind {
    Load,
    Click,
}

/// An event the host has to forward, optionally scoped to one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub event: MapEventKind,
    pub layer: Option<LayerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Load,
    Click {
        click: ClickEvent,
        layer: Option<LayerId>,
    },
}

/// One button of the basemap panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasemapControl {
    pub control_id: ControlId,
    pub label: Arc<str>,
    pub layer_id: LayerId,
}

impl BasemapControl {
    fn for_entry(entry: &BasemapEntry) -> Self {
        Self {
            control_id: ControlId::new(format!("basemap-{}", entry.layer_id)),
            label: Arc::clone(&entry.display_name),
            layer_id: entry.layer_id.clone(),
        }
    }
}

pub struct ParkMap<S> {
    surface: S,
    config: MapConfig,
    switcher: BasemapSwitcher,
    inspector: FeatureInspector,
    controls: Vec<BasemapControl>,
    handlers: HashMap<ControlId, BasemapHandle>,
}

impl<S: MapSurface> ParkMap<S> {
    pub fn new(surface: S, config: MapConfig) -> Result<Self, AppError> {
        let style = config.style();
        let default = style.default_basemap().ok_or(StyleError::NoBasemaps)?;
        let switcher = BasemapSwitcher::new(style.basemaps(), default)?;
        let inspector = FeatureInspector::new(config.overlay_layer().clone());

        let mut controls = Vec::with_capacity(switcher.entries().len());
        let mut handlers = HashMap::with_capacity(switcher.entries().len());
        for (handle, entry) in switcher.handles() {
            let control = BasemapControl::for_entry(entry);
            handlers.insert(control.control_id.clone(), handle);
            controls.push(control);
        }

        Ok(Self {
            surface,
            config,
            switcher,
            inspector,
            controls,
            handlers,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            Subscription {
                event: MapEventKind::Load,
                layer: None,
            },
            Subscription {
                event: MapEventKind::Click,
                layer: Some(self.inspector.overlay().clone()),
            },
        ]
    }

    pub fn controls(&self) -> &[BasemapControl] {
        &self.controls
    }

    pub fn selected_basemap(&self) -> &BasemapEntry {
        self.switcher.selected_entry()
    }

    pub fn handle_event(&mut self, event: MapEvent) -> Option<Popup> {
        match event {
            MapEvent::Load => {
                self.on_load();
                None
            }
            MapEvent::Click { click, layer } => self.on_click(&click, layer.as_ref()),
        }
    }

    /// Registers the overlay if the loaded style lacks it and applies the
    /// default basemap.
    pub fn on_load(&mut self) {
        let overlay = self.config.overlay_spec();
        if !self.surface.has_layer(&overlay.id) {
            if let Some((source_id, source)) = self.config.overlay_source() {
                self.surface.add_source(source_id, source);
            }
            self.surface.add_layer(overlay);
            tracing::info!(layer = %overlay.id, "registered overlay layer");
        }
        self.switcher.initialize(&mut self.surface);
        tracing::info!(basemap = %self.selected_basemap().layer_id, "map loaded");
    }

    /// Clicks outside the overlay are ignored.
    pub fn on_click(&mut self, click: &ClickEvent, layer: Option<&LayerId>) -> Option<Popup> {
        if layer != Some(self.inspector.overlay()) {
            return None;
        }
        self.inspector.inspect(&mut self.surface, click)
    }

    pub fn activate_control(&mut self, control_id: &str) -> Result<(), AppError> {
        let handle = *self
            .handlers
            .get(&ControlId::new(control_id))
            .ok_or_else(|| AppError::UnknownControl(ControlId::new(control_id)))?;
        self.switcher.select_basemap(&mut self.surface, handle);
        Ok(())
    }

    pub fn select_basemap(&mut self, layer_id: &str) -> Result<(), AppError> {
        Ok(self.switcher.select_by_layer_id(&mut self.surface, layer_id)?)
    }
}
