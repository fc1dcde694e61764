mod controller;
pub mod source;

use park_map_core::prelude::*;

pub use controller::{ControlInfo, EventSubscription, HostPopup, MapController};

use crate::state::view::MapError;
use crate::state::view::map::source::MapSource;

#[derive(uniffi::Object)]
pub struct MapState {
    config: MapConfig,
    style_json: String,
}

impl MapState {
    pub fn new(source: MapSource) -> Result<Self, MapError> {
        let mut style = StyleDocument::bundled()?;
        rewrite_style_sources(&mut style, &source);

        let config = MapConfig::new(style, LayerId::new(PROTECTED_AREAS_LAYER))?;
        let style_json = config.style().to_json()?;

        Ok(Self { config, style_json })
    }

    pub(crate) fn config(&self) -> &MapConfig {
        &self.config
    }
}

#[uniffi::export]
impl MapState {
    pub fn get_style(&self) -> String {
        self.style_json.clone()
    }
}

/// Points every vector source at the configured tile endpoint.
fn rewrite_style_sources(style: &mut StyleDocument, source: &MapSource) {
    for (id, spec) in style.sources.iter_mut() {
        if let SourceSpec::Vector { tiles, url, .. } = spec {
            tracing::debug!(%id, tiles = %source.overlay_tiles, "rewriting vector source");
            *url = None;
            *tiles = vec![source.overlay_tiles.clone()];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_vector_sources_only() {
        let mut style = StyleDocument::bundled().unwrap();
        rewrite_style_sources(&mut style, &MapSource::protected_areas("http://10.0.2.2:8080"));

        match style.source(&SourceId::new("protected-areas")).unwrap() {
            SourceSpec::Vector { tiles, url, .. } => {
                assert_eq!(tiles, &["http://10.0.2.2:8080/national_parks/{z}/{x}/{y}.pbf"]);
                assert!(url.is_none());
            }
            other => panic!("expected vector source, got {other:?}"),
        }
        match style.source(&SourceId::new("osm-tiles")).unwrap() {
            SourceSpec::Raster { tiles, .. } => {
                assert_eq!(tiles, &["https://tile.openstreetmap.org/{z}/{x}/{y}.png"]);
            }
            other => panic!("expected raster source, got {other:?}"),
        }
    }

    #[test]
    fn test_style_json_is_loadable() {
        let state = MapState::new(MapSource::protected_areas("http://localhost:3000")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&state.get_style()).unwrap();

        assert_eq!(value["version"], 8);
        assert_eq!(value["layers"][0]["id"], "osm-tiles");
        assert_eq!(value["layers"][0]["layout"]["visibility"], "visible");
        assert_eq!(value["layers"][1]["layout"]["visibility"], "none");
        assert_eq!(value["sources"]["osm-tiles"]["tileSize"], 256);
    }
}
