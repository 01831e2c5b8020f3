//! Overlay layers: registry, filters, regions and the controllers that keep
//! them attached to the renderer.

pub mod basemap;
pub mod filter;
pub mod lifecycle;
pub mod manager;
pub mod region;
pub mod registry;
