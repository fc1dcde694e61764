//! # park-map-core
//!
//! Interaction logic for a protected-areas map: a vector overlay of parks on
//! top of interchangeable raster basemaps.
//!
//! ## Example
//!
//! ```
//! use park_map_core::prelude::*;
//!
//! let config = MapConfig::protected_areas().unwrap();
//! let mut surface = MemorySurface::new();
//! for layer in &config.style().layers {
//!     surface.add_layer(layer);
//! }
//!
//! let mut map = ParkMap::new(surface, config).unwrap();
//! map.handle_event(MapEvent::Load);
//! map.select_basemap("esri-satellite").unwrap();
//!
//! assert_eq!(map.selected_basemap().layer_id.as_str(), "esri-satellite");
//! ```

pub mod app;
pub mod attributes;
pub mod basemap;
pub mod identifiers;
pub mod inspector;
pub mod popup;
pub mod style;
pub mod surface;

pub mod prelude {
    pub use crate::app::{AppError, BasemapControl, MapEvent, MapEventKind, ParkMap, Subscription};
    pub use crate::attributes::{DecodeError, ParkAttributes, PropertyMap, decode_extra};
    pub use crate::basemap::{BasemapEntry, BasemapError, BasemapHandle, BasemapSwitcher};
    pub use crate::identifiers::*;
    pub use crate::inspector::{ClickEvent, FeatureInspector};
    pub use crate::popup::PopupContent;
    pub use crate::style::{
        LayerKind, LayerSpec, MapConfig, PROTECTED_AREAS_LAYER, SourceSpec, StyleDocument, StyleError,
        Visibility,
    };
    pub use crate::surface::{LngLat, MapSurface, MemorySurface, Popup, RenderedFeature, ScreenPoint};
}

pub use prelude::*;
