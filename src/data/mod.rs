pub mod fetch;
pub mod geojson;
