//! Session configuration
//!
//! Everything the overlay engine needs to know about the outside world:
//! basemap style URLs, where the static overlay payloads live, the initial
//! view and which basemap POI layers get hidden. Every field has a default,
//! so a partial JSON document only overrides what it names.

use crate::core::constants::{
    HIDDEN_POI_LAYERS, INITIAL_CENTER, INITIAL_ZOOM, SATELLITE_STYLE_URL, VECTOR_STYLE_URL,
};
use crate::core::geo::LatLng;
use crate::layers::registry::OverlayKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub basemap: BasemapConfig,
    pub data: DataEndpoints,
    pub initial_view: InitialView,
    pub hidden_poi_layers: Vec<String>,
}

impl SessionConfig {
    /// Parses a configuration document, filling unspecified fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.basemap.vector_style_url.trim().is_empty() {
            return Err(Error::Config("basemap.vector_style_url is empty".into()));
        }
        if self.basemap.satellite_style_url.trim().is_empty() {
            return Err(Error::Config("basemap.satellite_style_url is empty".into()));
        }
        let [lng, lat] = self.initial_view.center;
        if !lng.is_finite() || !lat.is_finite() || !self.initial_view.zoom.is_finite() {
            return Err(Error::Config("initial_view must be finite".into()));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            basemap: BasemapConfig::default(),
            data: DataEndpoints::default(),
            initial_view: InitialView::default(),
            hidden_poi_layers: HIDDEN_POI_LAYERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    pub vector_style_url: String,
    pub satellite_style_url: String,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            vector_style_url: VECTOR_STYLE_URL.to_string(),
            satellite_style_url: SATELLITE_STYLE_URL.to_string(),
        }
    }
}

/// Static feature-collection endpoints, relative to `base_url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataEndpoints {
    pub base_url: String,
    pub ward_boundary: String,
    pub road_network: String,
    pub parcels_2016: String,
    pub parcels_2019: String,
    pub building_footprint: String,
    pub water_resources: String,
    pub historical_places: String,
}

impl DataEndpoints {
    /// Full URL of the static payload backing `kind`, `None` for region-tiled overlays
    pub fn url_for(&self, kind: OverlayKind) -> Option<String> {
        let path = match kind {
            OverlayKind::WardBoundary => &self.ward_boundary,
            OverlayKind::RoadNetwork => &self.road_network,
            OverlayKind::Parcels2016 => &self.parcels_2016,
            OverlayKind::Parcels2019 => &self.parcels_2019,
            OverlayKind::BuildingFootprint => &self.building_footprint,
            OverlayKind::WaterResources => &self.water_resources,
            OverlayKind::HistoricalPlaces => &self.historical_places,
            OverlayKind::Cadastral => return None,
        };
        Some(format!("{}{}", self.base_url.trim_end_matches('/'), path))
    }
}

impl Default for DataEndpoints {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            ward_boundary: "/merge_ward.json".into(),
            road_network: "/Road.json".into(),
            parcels_2016: "/merge.geojson".into(),
            parcels_2019: "/2019_final.geojson".into(),
            building_footprint: "/building_khokana.json".into(),
            water_resources: "/water.json".into(),
            historical_places: "/historical.geojson".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialView {
    /// `[lng, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
}

impl InitialView {
    pub fn center(&self) -> LatLng {
        LatLng::from_lng_lat(self.center)
    }
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
        }
    }
}
