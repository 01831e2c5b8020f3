//! Renderer capability interface
//!
//! The overlay engine never draws anything itself. It drives a map renderer
//! through [`Renderer`]: load a style, add/remove named sources and layers,
//! query what exists, move or fit the viewport and register layer-scoped
//! pointer handlers. Replacing the style discards every custom source and layer.

pub mod headless;
pub mod style;

pub use headless::HeadlessRenderer;
pub use style::{FitBoundsOptions, LayerSpec, LayerType, SourceSpec};

use crate::core::geo::{LatLng, LatLngBounds};
use crate::data::geojson::FeatureCollection;
use crate::input::events::{Cursor, HandlerId, LayerEventHandler, PointerEventKind};
use crate::ui::popup::Popup;
use crate::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Operations the overlay engine needs from a map renderer.
///
/// `remove_source`, `remove_layer` and `off` must succeed when the target does
/// not exist. Adds fail on duplicate ids and while no style is loaded.
pub trait Renderer {
    /// Replaces the basemap style, discarding all custom sources and layers
    fn set_style(&mut self, url: &str) -> Result<()>;

    fn style_url(&self) -> Option<&str>;

    fn is_style_loaded(&self) -> bool;

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()>;

    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn get_source(&self, id: &str) -> Option<&SourceSpec>;

    /// Replaces the data of an existing GeoJSON source in place
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()>;

    fn remove_layer(&mut self, id: &str) -> Result<()>;

    fn get_layer(&self, id: &str) -> Option<&LayerSpec>;

    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;

    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;

    fn set_layer_filter(&mut self, layer_id: &str, filter: Option<Value>) -> Result<()>;

    fn fit_bounds(&mut self, bounds: LatLngBounds, options: FitBoundsOptions);

    /// Moves the camera without animation
    fn jump_to(&mut self, center: LatLng, zoom: f64);

    /// Registers a handler for `event` on features of `layer_id`
    fn on(
        &mut self,
        event: PointerEventKind,
        layer_id: &str,
        handler: LayerEventHandler,
    ) -> HandlerId;

    fn off(&mut self, id: HandlerId);

    fn canvas_cursor(&self) -> Cursor;

    fn set_canvas_cursor(&mut self, cursor: Cursor);

    fn show_popup(&mut self, popup: Popup);
}

/// The single map instance, shared by every overlay controller.
pub type RendererHandle = Rc<RefCell<dyn Renderer>>;
