//! Engine-wide identifiers and magic numbers.
//! Keeping them in a single place makes it easier to line the overlays up with a style.

/// Default vector basemap style.
pub const VECTOR_STYLE_URL: &str =
    "https://map-init.gallimap.com/styles/light/style.json?accessToken=4ce1a22b-3b8b-4eeb-ba2f-51cb7448f559";

/// Default satellite (hybrid) basemap style.
pub const SATELLITE_STYLE_URL: &str =
    "https://api.maptiler.com/maps/hybrid/style.json?key=FX2ydQEN4qqjoeYQBh6L";

/// Initial map center as `[lng, lat]`.
pub const INITIAL_CENTER: [f64; 2] = [85.302713, 27.633172];

/// Initial map zoom.
pub const INITIAL_ZOOM: f64 = 12.2;

/// Padding in pixels used when fitting the viewport to a region.
pub const REGION_FIT_PADDING: f64 = 50.0;

/// Max zoom the viewport may reach when fitting to a region.
pub const REGION_FIT_MAX_ZOOM: f64 = 16.0;

/// Placeholder rendered for missing popup values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Basemap point-of-interest layers hidden after every style load.
pub const HIDDEN_POI_LAYERS: [&str; 6] = [
    "poi_z14",
    "poi_z15",
    "poi_z16",
    "poi_z17",
    "poi_z18",
    "poi_transit",
];

/// Injected place-of-worship symbol layer.
pub const TEMPLE_POI_LAYER_ID: &str = "poi_temple";

/// Basemap source the temple layer draws from.
pub const BASEMAP_TILE_SOURCE: &str = "gallitiles";

/// Catch-all fill for ownership labels outside the category table.
pub const UNKNOWN_OWNERSHIP_COLOR: &str = "#d8bfd8";
