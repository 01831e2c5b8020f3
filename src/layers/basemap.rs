//! Basemap style coordinator
//!
//! Switches between the vector and satellite basemaps and tunes whichever
//! style is loaded: the configured point-of-interest layers are hidden and a
//! place-of-worship symbol layer is injected. Styles re-fire their data signal
//! several times while loading, so tuning is safe to repeat.

use crate::core::config::SessionConfig;
use crate::core::constants::{BASEMAP_TILE_SOURCE, TEMPLE_POI_LAYER_ID};
use crate::rendering::{LayerSpec, LayerType, RendererHandle};
use crate::Result;
use serde_json::json;

pub struct BasemapStyleCoordinator {
    renderer: RendererHandle,
    vector_style_url: String,
    satellite_style_url: String,
    hidden_poi_layers: Vec<String>,
    satellite_active: bool,
    swap_pending: bool,
}

impl BasemapStyleCoordinator {
    pub fn new(renderer: RendererHandle, config: &SessionConfig) -> Self {
        Self {
            renderer,
            vector_style_url: config.basemap.vector_style_url.clone(),
            satellite_style_url: config.basemap.satellite_style_url.clone(),
            hidden_poi_layers: config.hidden_poi_layers.clone(),
            satellite_active: false,
            swap_pending: false,
        }
    }

    pub fn is_satellite_active(&self) -> bool {
        self.satellite_active
    }

    pub fn current_style_url(&self) -> &str {
        if self.satellite_active {
            &self.satellite_style_url
        } else {
            &self.vector_style_url
        }
    }

    /// Loads the vector basemap; not counted as a swap
    pub fn load_initial(&mut self) -> Result<()> {
        self.satellite_active = false;
        let url = self.vector_style_url.clone();
        log::info!("loading basemap {}", url);
        self.renderer.borrow_mut().set_style(&url)
    }

    /// Flips between vector and satellite and replaces the renderer style.
    ///
    /// Overlays must be re-attached once the new style reports loaded; see
    /// [`take_pending_swap`](Self::take_pending_swap).
    pub fn toggle(&mut self) -> Result<()> {
        self.satellite_active = !self.satellite_active;
        let url = self.current_style_url().to_string();
        log::info!(
            "switching basemap to {} ({})",
            if self.satellite_active { "satellite" } else { "vector" },
            url
        );
        self.swap_pending = true;
        self.renderer.borrow_mut().set_style(&url)
    }

    /// Returns whether a toggle is waiting for its style load, clearing the flag
    pub fn take_pending_swap(&mut self) -> bool {
        std::mem::take(&mut self.swap_pending)
    }

    /// Hides the configured POI layers and injects the temple layer.
    ///
    /// Does nothing until a style is loaded. Styles without the basemap tile
    /// source (satellite) only get the hiding.
    pub fn tune_basemap(&self) -> Result<()> {
        let mut renderer = self.renderer.borrow_mut();
        if !renderer.is_style_loaded() {
            return Ok(());
        }

        for layer_id in &self.hidden_poi_layers {
            if renderer.get_layer(layer_id).is_some() {
                renderer.set_layout_property(layer_id, "visibility", json!("none"))?;
            }
        }

        if renderer.get_layer(TEMPLE_POI_LAYER_ID).is_some() {
            return Ok(());
        }
        if renderer.get_source(BASEMAP_TILE_SOURCE).is_none() {
            log::debug!(
                "style has no '{}' source, skipping {}",
                BASEMAP_TILE_SOURCE,
                TEMPLE_POI_LAYER_ID
            );
            return Ok(());
        }
        renderer.add_layer(temple_layer())
    }
}

/// Place-of-worship symbols drawn from the basemap's own POI tiles
pub fn temple_layer() -> LayerSpec {
    LayerSpec::new(TEMPLE_POI_LAYER_ID, LayerType::Symbol, BASEMAP_TILE_SOURCE)
        .with_source_layer("poi")
        .with_filter(json!(["all", ["==", "class", "place_of_worship"]]))
        .with_layout(json!({
            "icon-image": "{icon_type}",
            "icon-size": 0.7,
            "text-anchor": "top",
            "text-field": "{name}",
            "text-font": ["Roboto Condensed Italic"],
            "text-offset": [0, 0.9],
            "text-size": 10,
            "text-transform": "uppercase",
            "visibility": "visible",
        }))
        .with_paint(json!({
            "text-halo-blur": 0.5,
            "text-halo-color": "#ffffff",
            "text-halo-width": 1,
        }))
        .with_zoom_range(Some(14.0), None)
}
