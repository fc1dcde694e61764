use std::sync::{Arc, Mutex, PoisonError};

use geo::Point;
use park_map_core::prelude::*;

use crate::host::{HostMap, HostSurface};
use crate::state::view::MapError;
use crate::state::view::map::MapState;

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ControlInfo {
    pub id: String,
    pub label: String,
    pub layer_id: String,
}

/// An event the host has to forward to the controller. `layer_id` limits
/// the subscription to hits on that layer.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct EventSubscription {
    pub event: String,
    pub layer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct HostPopup {
    pub longitude: f64,
    pub latitude: f64,
    pub html: String,
}

impl From<Popup> for HostPopup {
    fn from(popup: Popup) -> Self {
        Self {
            longitude: popup.lng_lat.x(),
            latitude: popup.lng_lat.y(),
            html: popup.html,
        }
    }
}

/// Drives one map view. Handlers run one at a time; the lock only exists
/// because exported objects have to be shareable across threads.
#[derive(uniffi::Object)]
pub struct MapController {
    map: Mutex<ParkMap<HostSurface>>,
}

impl MapController {
    fn with_map<R>(&self, f: impl FnOnce(&mut ParkMap<HostSurface>) -> R) -> R {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut map)
    }
}

#[uniffi::export]
impl MapController {
    #[uniffi::constructor]
    pub fn new(state: Arc<MapState>, host: Arc<dyn HostMap>) -> Result<Self, MapError> {
        let map = ParkMap::new(HostSurface::new(host), state.config().clone())?;
        Ok(Self {
            map: Mutex::new(map),
        })
    }

    pub fn subscriptions(&self) -> Vec<EventSubscription> {
        self.with_map(|map| {
            map.subscriptions()
                .into_iter()
                .map(|subscription| EventSubscription {
                    event: subscription.event.to_string(),
                    layer_id: subscription.layer.map(|layer| layer.to_string()),
                })
                .collect()
        })
    }

    pub fn controls(&self) -> Vec<ControlInfo> {
        self.with_map(|map| {
            map.controls()
                .iter()
                .map(|control| ControlInfo {
                    id: control.control_id.to_string(),
                    label: control.label.to_string(),
                    layer_id: control.layer_id.to_string(),
                })
                .collect()
        })
    }

    pub fn selected_basemap(&self) -> String {
        self.with_map(|map| map.selected_basemap().layer_id.to_string())
    }

    pub fn on_load(&self) {
        self.with_map(|map| map.handle_event(MapEvent::Load));
    }

    /// Returns the popup that was opened, if any feature was hit.
    pub fn on_click(
        &self,
        x: f64,
        y: f64,
        longitude: f64,
        latitude: f64,
        layer_id: Option<String>,
    ) -> Option<HostPopup> {
        let event = MapEvent::Click {
            click: ClickEvent {
                point: ScreenPoint::new(x, y),
                lng_lat: Point::new(longitude, latitude),
            },
            layer: layer_id.map(LayerId::from),
        };
        self.with_map(|map| map.handle_event(event)).map(HostPopup::from)
    }

    pub fn activate_control(&self, control_id: String) -> Result<(), MapError> {
        Ok(self.with_map(|map| map.activate_control(&control_id))?)
    }

    pub fn select_basemap(&self, layer_id: String) -> Result<(), MapError> {
        Ok(self.with_map(|map| map.select_basemap(&layer_id))?)
    }
}
