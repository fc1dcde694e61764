//! Declarative style document handed to the rendering engine.
//!
//! The document follows the MapLibre style layout closely enough that the
//! host can load the serialized form directly. Only the parts the map logic
//! reads are typed; paint and layout properties pass through as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::basemap::BasemapEntry;
use crate::identifiers::{LayerId, SourceId};

const DEFAULT_STYLE: &str = include_str!("../../../assets/park-style.json");

/// Layer id of the protected-areas overlay in the bundled style.
pub const PROTECTED_AREAS_LAYER: &str = "protected-areas";

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("failed to parse style document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("overlay layer not found in style: {0}")]
    MissingOverlay(LayerId),

    #[error("overlay layer {0} has no source")]
    OverlayWithoutSource(LayerId),

    #[error("overlay layer {layer} references unknown source {source_id}")]
    UnknownSource { layer: LayerId, source_id: SourceId },

    #[error("style declares no raster basemaps")]
    NoBasemaps,
}

/// Layer visibility as understood by the rendering engine.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum Visibility {
    #[default]
    #[serde(rename = "visible")]
    #[strum(serialize = "visible")]
    Visible,
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Hidden,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LayerKind {
    Background,
    Fill,
    Line,
    Symbol,
    Raster,
    Circle,
    FillExtrusion,
    Heatmap,
    Hillshade,
}

fn default_tile_size() -> u32 {
    512
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    Raster {
        tiles: Vec<String>,
        #[serde(rename = "tileSize", default = "default_tile_size")]
        tile_size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    Vector {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tiles: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minzoom: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maxzoom: Option<u8>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: LayerId,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    #[serde(rename = "source-layer", default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LayerSpec {
    /// Human readable label, taken from `metadata.name` when present.
    pub fn display_name(&self) -> &str {
        self.metadata
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    pub sources: BTreeMap<SourceId, SourceSpec>,
    pub layers: Vec<LayerSpec>,
}

impl StyleDocument {
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The protected-areas style shipped with the crate.
    pub fn bundled() -> Result<Self, StyleError> {
        Self::from_json(DEFAULT_STYLE)
    }

    pub fn to_json(&self) -> Result<String, StyleError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn layer(&self, id: &LayerId) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    pub fn source(&self, id: &SourceId) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    /// Raster layers in declaration order, one basemap each.
    pub fn basemaps(&self) -> Vec<BasemapEntry> {
        self.layers
            .iter()
            .filter(|layer| layer.kind == LayerKind::Raster)
            .map(|layer| BasemapEntry::new(layer.display_name(), layer.id.clone()))
            .collect()
    }

    /// The first raster layer declared visible, falling back to the first
    /// raster layer when every basemap starts hidden.
    pub fn default_basemap(&self) -> Option<&LayerId> {
        let mut rasters = self.layers.iter().filter(|layer| layer.kind == LayerKind::Raster);
        let first = rasters.clone().next();
        rasters
            .find(|layer| layer.layout.visibility == Visibility::Visible)
            .or(first)
            .map(|layer| &layer.id)
    }
}

/// Style plus the id of the layer clicks are inspected on.
#[derive(Debug, Clone)]
pub struct MapConfig {
    style: StyleDocument,
    overlay_layer: LayerId,
    overlay_index: usize,
}

impl MapConfig {
    pub fn new(style: StyleDocument, overlay_layer: LayerId) -> Result<Self, StyleError> {
        let overlay_index = style
            .layers
            .iter()
            .position(|layer| layer.id == overlay_layer)
            .ok_or_else(|| StyleError::MissingOverlay(overlay_layer.clone()))?;
        let overlay = &style.layers[overlay_index];
        let source_id = overlay
            .source
            .as_ref()
            .ok_or_else(|| StyleError::OverlayWithoutSource(overlay_layer.clone()))?;
        if style.source(source_id).is_none() {
            return Err(StyleError::UnknownSource {
                layer: overlay_layer,
                source_id: source_id.clone(),
            });
        }
        if style.basemaps().is_empty() {
            return Err(StyleError::NoBasemaps);
        }

        Ok(Self {
            style,
            overlay_layer,
            overlay_index,
        })
    }

    /// The bundled protected-areas style.
    pub fn protected_areas() -> Result<Self, StyleError> {
        Self::new(StyleDocument::bundled()?, LayerId::new(PROTECTED_AREAS_LAYER))
    }

    pub fn style(&self) -> &StyleDocument {
        &self.style
    }

    pub fn overlay_layer(&self) -> &LayerId {
        &self.overlay_layer
    }

    pub fn overlay_spec(&self) -> &LayerSpec {
        &self.style.layers[self.overlay_index]
    }

    pub fn overlay_source(&self) -> Option<(&SourceId, &SourceSpec)> {
        let id = self.overlay_spec().source.as_ref()?;
        self.style.sources.get_key_value(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_style_parses() {
        let config = MapConfig::protected_areas().unwrap();
        let style = config.style();

        assert_eq!(style.version, 8);
        assert_eq!(style.layers.len(), 5);
        assert_eq!(config.overlay_layer().as_str(), "protected-areas");
        assert_eq!(config.overlay_spec().source_layer.as_deref(), Some("polygons"));

        let (source_id, source) = config.overlay_source().unwrap();
        assert_eq!(source_id.as_str(), "protected-areas");
        assert!(matches!(source, SourceSpec::Vector { .. }));
    }

    #[test]
    fn test_basemaps_in_declaration_order() {
        let config = MapConfig::protected_areas().unwrap();
        let ids: Vec<_> = config
            .style()
            .basemaps()
            .iter()
            .map(|entry| entry.layer_id.to_string())
            .collect();

        assert_eq!(
            ids,
            ["osm-tiles", "image-tiles", "google-satellite", "esri-satellite"]
        );
        assert_eq!(config.style().basemaps()[2].display_name.as_ref(), "Google Satellite");
        assert_eq!(config.style().default_basemap().unwrap().as_str(), "osm-tiles");
    }

    #[test]
    fn test_default_basemap_falls_back_to_first_raster() {
        let json = r#"{
            "version": 8,
            "sources": { "a": { "type": "raster", "tiles": ["a/{z}/{x}/{y}"] } },
            "layers": [
                { "id": "a", "type": "raster", "source": "a", "layout": { "visibility": "none" } },
                { "id": "b", "type": "raster", "source": "a", "layout": { "visibility": "none" } }
            ]
        }"#;
        let style = StyleDocument::from_json(json).unwrap();

        assert_eq!(style.default_basemap().unwrap().as_str(), "a");
        // display name falls back to the id
        assert_eq!(style.basemaps()[1].display_name.as_ref(), "b");
    }

    #[test]
    fn test_visibility_strings() {
        assert_eq!(Visibility::Visible.to_string(), "visible");
        assert_eq!(Visibility::Hidden.as_ref(), "none");
        assert_eq!("none".parse::<Visibility>().unwrap(), Visibility::Hidden);
        assert_eq!(serde_json::to_string(&Visibility::Hidden).unwrap(), "\"none\"");
    }

    #[test]
    fn test_layout_keeps_unknown_properties() {
        let json = r#"{ "id": "x", "type": "line", "layout": { "line-cap": "round" } }"#;
        let layer: LayerSpec = serde_json::from_str(json).unwrap();

        assert_eq!(layer.kind, LayerKind::Line);
        assert_eq!(layer.layout.visibility, Visibility::Visible);
        assert_eq!(layer.layout.other.get("line-cap"), Some(&Value::from("round")));

        let round_trip = serde_json::to_value(&layer).unwrap();
        assert_eq!(round_trip["layout"]["line-cap"], "round");
        assert_eq!(round_trip["layout"]["visibility"], "visible");
    }

    #[test]
    fn test_missing_overlay_is_rejected() {
        let style = StyleDocument::bundled().unwrap();
        let err = MapConfig::new(style, LayerId::new("parks")).unwrap_err();

        assert!(matches!(err, StyleError::MissingOverlay(ref id) if id.as_str() == "parks"));
    }
}
