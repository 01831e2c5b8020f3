//! Prelude module for common parcelmap types and traits
//!
//! Re-exports what a host needs to drive the overlay engine with
//! `use parcelmap::prelude::*;`

pub use crate::core::{
    config::{BasemapConfig, DataEndpoints, InitialView, SessionConfig},
    geo::{LatLng, LatLngBounds},
};

pub use crate::data::{
    fetch::{DataFetcher, HttpFetcher, MemoryFetcher},
    geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry},
};

pub use crate::input::events::{Cursor, Interaction, PointerEvent, PointerEventKind};

pub use crate::layers::{
    basemap::BasemapStyleCoordinator,
    filter::{CategoryId, FilterSelection, Generation},
    lifecycle::{FetchRequest, LifecycleState, OverlayController},
    manager::{FilterField, LayerVisibility, OverlayManager},
    region::RegionId,
    registry::OverlayKind,
};

pub use crate::rendering::{HeadlessRenderer, LayerSpec, Renderer, RendererHandle, SourceSpec};

pub use crate::runtime::{FetchCompletion, FetchQueue};

pub use crate::ui::popup::{Popup, PopupTemplate};

pub use crate::{Error as MapError, Result};

pub use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
