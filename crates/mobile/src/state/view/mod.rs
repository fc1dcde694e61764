use std::sync::Arc;

use park_map_core::prelude::{AppError, BasemapError, StyleError};
use tokio::sync::RwLock;

use crate::state::view::map::{MapState, source::MapSource};

pub mod map;

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MapError {
    #[error("{0}")]
    Style(String),

    #[error("{0}")]
    UnknownBasemap(String),

    #[error("{0}")]
    UnknownControl(String),
}

impl From<StyleError> for MapError {
    fn from(err: StyleError) -> Self {
        MapError::Style(err.to_string())
    }
}

impl From<AppError> for MapError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::UnknownControl(_) => MapError::UnknownControl(err.to_string()),
            AppError::Basemap(BasemapError::Unknown(_)) => MapError::UnknownBasemap(err.to_string()),
            AppError::Basemap(_) | AppError::Style(_) => MapError::Style(err.to_string()),
        }
    }
}

#[derive(uniffi::Object)]
pub struct ViewState {
    tiles_base_url: String,
    map: RwLock<Option<Arc<MapState>>>,
}

#[uniffi::export]
impl ViewState {
    #[uniffi::constructor]
    pub fn new(tiles_base_url: String) -> Self {
        Self {
            tiles_base_url,
            map: RwLock::new(None),
        }
    }

    pub async fn get_map_state(&self) -> Result<Arc<MapState>, MapError> {
        if let Some(ref map) = *(self.map.read().await) {
            return Ok(Arc::clone(map));
        }

        let mut guard = self.map.write().await;
        // another caller may have filled it while we waited for the lock
        if let Some(ref map) = *guard {
            return Ok(Arc::clone(map));
        }
        let new_map = Arc::new(MapState::new(MapSource::protected_areas(&self.tiles_base_url))?);
        *guard = Some(Arc::clone(&new_map));

        Ok(new_map)
    }
}
