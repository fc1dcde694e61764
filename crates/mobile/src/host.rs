//! Bridge to the host's rendering engine.
//!
//! The Kotlin/Swift side implements [`HostMap`] on top of its MapLibre view.
//! [`HostSurface`] adapts it to the core [`MapSurface`] trait; values cross
//! the boundary as strings and JSON text.

use std::sync::Arc;

use geojson::feature::Id;
use park_map_core::prelude::*;
use serde_json::Value;

/// A rendered feature as reported by the host.
#[derive(Debug, Clone, uniffi::Record)]
pub struct HostFeature {
    pub id: Option<String>,
    /// The feature's attribute object, serialized as JSON.
    pub properties_json: String,
}

/// Rendering engine callbacks. Implementations must not call back into a
/// `MapController` from inside these methods.
#[uniffi::export(with_foreign)]
pub trait HostMap: Send + Sync {
    fn has_layer(&self, layer_id: String) -> bool;

    fn add_source_json(&self, source_id: String, source_json: String);

    fn add_layer_json(&self, layer_json: String);

    /// `visibility` is either "visible" or "none".
    fn set_layer_visibility(&self, layer_id: String, visibility: String);

    fn layer_visibility(&self, layer_id: String) -> Option<String>;

    /// Topmost feature first.
    fn query_rendered_features(&self, x: f64, y: f64, layer_ids: Vec<String>) -> Vec<HostFeature>;

    fn open_popup(&self, longitude: f64, latitude: f64, html: String);

    fn close_popup(&self);
}

pub struct HostSurface {
    host: Arc<dyn HostMap>,
}

impl HostSurface {
    pub fn new(host: Arc<dyn HostMap>) -> Self {
        Self { host }
    }
}

fn convert_feature(feature: HostFeature) -> RenderedFeature {
    let properties = match serde_json::from_str(&feature.properties_json) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(id = ?feature.id, "host returned feature properties that are not a JSON object");
            PropertyMap::new()
        }
    };

    RenderedFeature {
        id: feature.id.map(Id::String),
        properties,
    }
}

impl MapSurface for HostSurface {
    fn has_layer(&self, layer: &LayerId) -> bool {
        self.host.has_layer(layer.to_string())
    }

    fn add_source(&mut self, id: &SourceId, source: &SourceSpec) {
        match serde_json::to_string(source) {
            Ok(json) => self.host.add_source_json(id.to_string(), json),
            Err(err) => tracing::error!(%id, %err, "failed to serialize source"),
        }
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        match serde_json::to_string(layer) {
            Ok(json) => self.host.add_layer_json(json),
            Err(err) => tracing::error!(id = %layer.id, %err, "failed to serialize layer"),
        }
    }

    fn set_layer_visibility(&mut self, layer: &LayerId, visibility: Visibility) {
        self.host
            .set_layer_visibility(layer.to_string(), visibility.to_string());
    }

    fn layer_visibility(&self, layer: &LayerId) -> Option<Visibility> {
        let raw = self.host.layer_visibility(layer.to_string())?;
        match raw.parse::<Visibility>() {
            Ok(visibility) => Some(visibility),
            Err(_) => {
                tracing::warn!(%layer, %raw, "host reported unknown visibility");
                None
            }
        }
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[LayerId]) -> Vec<RenderedFeature> {
        let layer_ids = layers.iter().map(LayerId::to_string).collect();
        self.host
            .query_rendered_features(point.x, point.y, layer_ids)
            .into_iter()
            .map(convert_feature)
            .collect()
    }

    fn open_popup(&mut self, lng_lat: LngLat, html: &str) {
        self.host.open_popup(lng_lat.x(), lng_lat.y(), html.to_owned());
    }

    fn close_popup(&mut self) {
        self.host.close_popup();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::Point;
    use std::sync::Mutex;

    /// Host double backed by a [`MemorySurface`], speaking the string
    /// protocol a Kotlin implementation would.
    #[derive(Default)]
    pub(crate) struct FakeHost {
        pub(crate) inner: Mutex<MemorySurface>,
        pub(crate) added_sources: Mutex<Vec<String>>,
    }

    impl HostMap for FakeHost {
        fn has_layer(&self, layer_id: String) -> bool {
            self.inner.lock().unwrap().has_layer(&layer_id.into())
        }

        fn add_source_json(&self, source_id: String, source_json: String) {
            let source: SourceSpec = serde_json::from_str(&source_json).unwrap();
            self.inner.lock().unwrap().add_source(&source_id.clone().into(), &source);
            self.added_sources.lock().unwrap().push(source_id);
        }

        fn add_layer_json(&self, layer_json: String) {
            let layer: LayerSpec = serde_json::from_str(&layer_json).unwrap();
            self.inner.lock().unwrap().add_layer(&layer);
        }

        fn set_layer_visibility(&self, layer_id: String, visibility: String) {
            let visibility = visibility.parse::<Visibility>().unwrap();
            self.inner
                .lock()
                .unwrap()
                .set_layer_visibility(&layer_id.into(), visibility);
        }

        fn layer_visibility(&self, layer_id: String) -> Option<String> {
            self.inner
                .lock()
                .unwrap()
                .layer_visibility(&layer_id.into())
                .map(|v| v.to_string())
        }

        fn query_rendered_features(&self, x: f64, y: f64, layer_ids: Vec<String>) -> Vec<HostFeature> {
            let layers: Vec<LayerId> = layer_ids.into_iter().map(LayerId::from).collect();
            self.inner
                .lock()
                .unwrap()
                .query_rendered_features(ScreenPoint::new(x, y), &layers)
                .into_iter()
                .map(|feature| HostFeature {
                    id: None,
                    properties_json: Value::Object(feature.properties).to_string(),
                })
                .collect()
        }

        fn open_popup(&self, longitude: f64, latitude: f64, html: String) {
            self.inner
                .lock()
                .unwrap()
                .open_popup(Point::new(longitude, latitude), &html);
        }

        fn close_popup(&self) {
            self.inner.lock().unwrap().close_popup();
        }
    }

    #[test]
    fn test_visibility_crosses_as_strings() {
        let host = Arc::new(FakeHost::default());
        host.inner
            .lock()
            .unwrap()
            .register_layer(LayerId::new("osm-tiles"), Visibility::Visible);
        let mut surface = HostSurface::new(host.clone());

        surface.set_layer_visibility(&LayerId::new("osm-tiles"), Visibility::Hidden);

        assert_eq!(
            host.layer_visibility("osm-tiles".into()).as_deref(),
            Some("none")
        );
        assert_eq!(
            surface.layer_visibility(&LayerId::new("osm-tiles")),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn test_malformed_host_properties_become_empty() {
        let feature = convert_feature(HostFeature {
            id: Some("way/123".into()),
            properties_json: "not json".into(),
        });

        assert!(feature.properties.is_empty());
        assert_eq!(feature.id, Some(Id::String("way/123".into())));
    }

    #[test]
    fn test_popup_coordinates_are_lng_lat() {
        let host = Arc::new(FakeHost::default());
        let mut surface = HostSurface::new(host.clone());

        surface.open_popup(Point::new(-122.4, 37.8), "<b>x</b>");

        let inner = host.inner.lock().unwrap();
        let popup = inner.popup().unwrap();
        assert_eq!(popup.lng_lat.x(), -122.4);
        assert_eq!(popup.lng_lat.y(), 37.8);
    }
}
