//! # parcelmap
//!
//! Overlay lifecycle and filter synchronisation for a land-parcel ownership
//! map. A set of independently toggleable overlays (ward boundaries, roads,
//! two parcel generations, building footprints, water bodies, historical
//! places and per-region cadastral tiles) is kept consistent with visibility
//! flags, applied filters and basemap style swaps on a renderer that drops
//! every custom source and layer whenever its style is replaced.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::SessionConfig,
    geo::{LatLng, LatLngBounds},
};

pub use crate::data::{
    fetch::{DataFetcher, HttpFetcher, MemoryFetcher},
    geojson::{FeatureCollection, GeoJsonFeature},
};

pub use crate::layers::{
    basemap::BasemapStyleCoordinator,
    filter::{resolve, CategoryId, FilterSelection, Generation},
    lifecycle::{LifecycleState, OverlayController, OverlayState},
    manager::{FilterField, LayerVisibility, OverlayManager},
    region::{RegionId, RegionOverlayProvider},
    registry::{OverlayDefinition, OverlayKind},
};

pub use crate::rendering::{HeadlessRenderer, Renderer, RendererHandle};

pub use crate::ui::popup::Popup;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Fetch failed for {overlay}: {message}")]
    Fetch { overlay: String, message: String },

    #[error("Renderer rejected change: {0}")]
    Reconciliation(String),

    #[error("Unmapped land category: {0}")]
    UnmappedCategory(String),

    #[error("Unknown cadastral region: {0}")]
    UnknownRegion(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
