//! The rendering engine as seen by the map logic.
//!
//! Implementations can drive a real renderer through FFI or keep everything
//! in memory. All calls happen on the thread that dispatches map events.

use std::collections::BTreeMap;

use geo::{Intersects, Point, Rect};
use geojson::feature::Id;
use serde_json::{Map, Value};

use crate::identifiers::{LayerId, SourceId};
use crate::style::{LayerSpec, SourceSpec, Visibility};

/// Geographic position, longitude in x and latitude in y.
pub type LngLat = Point<f64>;

/// Pixel position relative to the top-left corner of the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A feature hit by a rendered-feature query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedFeature {
    pub id: Option<Id>,
    pub properties: Map<String, Value>,
}

impl RenderedFeature {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            properties,
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub lng_lat: LngLat,
    pub html: String,
}

pub trait MapSurface {
    fn has_layer(&self, layer: &LayerId) -> bool;

    fn add_source(&mut self, id: &SourceId, source: &SourceSpec);

    fn add_layer(&mut self, layer: &LayerSpec);

    fn set_layer_visibility(&mut self, layer: &LayerId, visibility: Visibility);

    fn layer_visibility(&self, layer: &LayerId) -> Option<Visibility>;

    /// Features rendered at `point` on any of `layers`, topmost first.
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[LayerId]) -> Vec<RenderedFeature>;

    /// Shows `html` anchored at `lng_lat`, replacing any open popup.
    fn open_popup(&mut self, lng_lat: LngLat, html: &str);

    fn close_popup(&mut self);
}

#[derive(Debug, Clone)]
struct PlacedFeature {
    bounds: Rect<f64>,
    feature: RenderedFeature,
}

#[derive(Debug, Clone)]
struct MemoryLayer {
    id: LayerId,
    visibility: Visibility,
    // topmost first within the layer
    features: Vec<PlacedFeature>,
}

/// In-memory surface with a single popup slot.
///
/// Layers registered later render above earlier ones, matching the order of
/// a style's layer list. Features are placed as screen-space rectangles.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    sources: BTreeMap<SourceId, SourceSpec>,
    layers: Vec<MemoryLayer>,
    popup: Option<Popup>,
    popups_opened: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_layer(&mut self, id: LayerId, visibility: Visibility) {
        if let Some(layer) = self.layer_mut(&id) {
            layer.visibility = visibility;
            return;
        }
        self.layers.push(MemoryLayer {
            id,
            visibility,
            features: Vec::new(),
        });
    }

    /// Places `feature` on `layer` covering `bounds`. Features placed later on
    /// the same layer are drawn on top.
    pub fn place_feature(&mut self, layer: &LayerId, bounds: Rect<f64>, feature: RenderedFeature) {
        if self.layer_mut(layer).is_none() {
            self.register_layer(layer.clone(), Visibility::Visible);
        }
        if let Some(layer) = self.layer_mut(layer) {
            layer.features.insert(0, PlacedFeature { bounds, feature });
        }
    }

    pub fn layer_visibility_of(&self, layer: &str) -> Option<Visibility> {
        self.layers
            .iter()
            .find(|entry| entry.id == *layer)
            .map(|entry| entry.visibility)
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &LayerId> {
        self.layers.iter().map(|layer| &layer.id)
    }

    pub fn source(&self, id: &SourceId) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn popups_opened(&self) -> usize {
        self.popups_opened
    }

    fn layer_mut(&mut self, id: &LayerId) -> Option<&mut MemoryLayer> {
        self.layers.iter_mut().find(|layer| &layer.id == id)
    }
}

impl MapSurface for MemorySurface {
    fn has_layer(&self, layer: &LayerId) -> bool {
        self.layers.iter().any(|entry| &entry.id == layer)
    }

    fn add_source(&mut self, id: &SourceId, source: &SourceSpec) {
        self.sources.insert(id.clone(), source.clone());
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        self.register_layer(layer.id.clone(), layer.layout.visibility);
    }

    fn set_layer_visibility(&mut self, layer: &LayerId, visibility: Visibility) {
        match self.layer_mut(layer) {
            Some(entry) => entry.visibility = visibility,
            None => tracing::warn!(%layer, "visibility set on unknown layer"),
        }
    }

    fn layer_visibility(&self, layer: &LayerId) -> Option<Visibility> {
        self.layer_visibility_of(layer.as_str())
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[LayerId]) -> Vec<RenderedFeature> {
        let point = Point::new(point.x, point.y);
        self.layers
            .iter()
            .rev()
            .filter(|layer| layer.visibility == Visibility::Visible && layers.contains(&layer.id))
            .flat_map(|layer| layer.features.iter())
            .filter(|placed| placed.bounds.intersects(&point))
            .map(|placed| placed.feature.clone())
            .collect()
    }

    fn open_popup(&mut self, lng_lat: LngLat, html: &str) {
        self.popup = Some(Popup {
            lng_lat,
            html: html.to_owned(),
        });
        self.popups_opened += 1;
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }
}
