//! Click-to-popup pipeline for the protected-areas overlay.

use std::slice;

use crate::attributes::ParkAttributes;
use crate::identifiers::LayerId;
use crate::popup::PopupContent;
use crate::surface::{LngLat, MapSurface, Popup, RenderedFeature, ScreenPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub point: ScreenPoint,
    pub lng_lat: LngLat,
}

#[derive(Debug, Clone)]
pub struct FeatureInspector {
    overlay: LayerId,
}

impl FeatureInspector {
    pub fn new(overlay: LayerId) -> Self {
        Self { overlay }
    }

    pub fn overlay(&self) -> &LayerId {
        &self.overlay
    }

    pub fn compose(&self, feature: &RenderedFeature) -> PopupContent {
        PopupContent::from_attributes(&ParkAttributes::from_properties(&feature.properties))
    }

    /// Opens a popup for the topmost overlay feature under the click.
    ///
    /// Overlapping polygons are not disambiguated: whichever the renderer
    /// reports first wins. Returns `None` when nothing is under the pointer.
    pub fn inspect<S: MapSurface + ?Sized>(&self, surface: &mut S, click: &ClickEvent) -> Option<Popup> {
        let features = surface.query_rendered_features(click.point, slice::from_ref(&self.overlay));
        let Some(feature) = features.first() else {
            tracing::trace!(x = click.point.x, y = click.point.y, "no feature under click");
            return None;
        };
        tracing::debug!(
            id = ?feature.id,
            hits = features.len(),
            "inspecting protected area"
        );

        let html = self.compose(feature).to_html();
        surface.open_popup(click.lng_lat, &html);

        Some(Popup {
            lng_lat: click.lng_lat,
            html,
        })
    }
}
