//! Source and layer descriptors handed to the renderer.
//!
//! Field names serialise the way style documents spell them (`source-layer`,
//! `minzoom`, ...), so a descriptor can be forwarded to a style-driven
//! renderer as JSON without a translation step.

use crate::data::geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Renderer source descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    /// Inline feature collection
    Geojson { data: FeatureCollection },
    /// Tiled vector source addressed by `{z}/{x}/{y}` templates
    Vector {
        tiles: Vec<String>,
        /// `[west, south, east, north]`
        bounds: [f64; 4],
        minzoom: u8,
        maxzoom: u8,
    },
}

impl SourceSpec {
    pub fn geojson(data: FeatureCollection) -> Self {
        SourceSpec::Geojson { data }
    }

    /// Inline data for GeoJSON sources
    pub fn data(&self) -> Option<&FeatureCollection> {
        match self {
            SourceSpec::Geojson { data } => Some(data),
            SourceSpec::Vector { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Fill,
    Line,
    Circle,
    Symbol,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Fill => write!(f, "fill"),
            LayerType::Line => write!(f, "line"),
            LayerType::Circle => write!(f, "circle"),
            LayerType::Symbol => write!(f, "symbol"),
        }
    }
}

/// Renderer style layer descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub source: String,
    #[serde(rename = "source-layer", default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default = "empty_object")]
    pub layout: Value,
    #[serde(default = "empty_object")]
    pub paint: Value,
    #[serde(rename = "minzoom", default, skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(rename = "maxzoom", default, skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, layer_type: LayerType, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer_type,
            source: source.into(),
            source_layer: None,
            filter: None,
            layout: empty_object(),
            paint: empty_object(),
            min_zoom: None,
            max_zoom: None,
        }
    }

    pub fn with_paint(mut self, paint: Value) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_layout(mut self, layout: Value) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Layout `visibility`, defaulting to visible like style documents do
    pub fn is_visible(&self) -> bool {
        self.layout.get("visibility").and_then(Value::as_str) != Some("none")
    }
}

/// Options for `fit_bounds`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBoundsOptions {
    pub padding: f64,
    #[serde(rename = "maxZoom")]
    pub max_zoom: f64,
}
