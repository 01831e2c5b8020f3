//! In-memory renderer
//!
//! Keeps the source/layer/handler bookkeeping a style-driven renderer keeps,
//! without drawing. Used by tests and by hosts that want to inspect what the
//! overlay engine would put on a map.

use super::{FitBoundsOptions, LayerSpec, Renderer, SourceSpec};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::data::geojson::FeatureCollection;
use crate::input::events::{
    Cursor, HandlerId, Interaction, LayerEventHandler, PointerEvent, PointerEventKind,
};
use crate::prelude::HashMap;
use crate::ui::popup::Popup;
use crate::{Error, Result};
use serde_json::Value;

struct Registration {
    id: HandlerId,
    event: PointerEventKind,
    layer_id: String,
    handler: LayerEventHandler,
}

/// Renderer that records state instead of drawing it
pub struct HeadlessRenderer {
    style_url: Option<String>,
    style_loaded: bool,
    auto_load_styles: bool,
    style_loads: usize,
    native_sources: Vec<(String, SourceSpec)>,
    native_layers: Vec<LayerSpec>,
    sources: HashMap<String, SourceSpec>,
    /// Layers in draw order
    layers: Vec<LayerSpec>,
    handlers: Vec<Registration>,
    next_handler_id: u64,
    cursor: Cursor,
    popups: Vec<Popup>,
    fits: Vec<(LatLngBounds, FitBoundsOptions)>,
    view: Option<(LatLng, f64)>,
}

impl HeadlessRenderer {
    /// A renderer with an empty basemap style that loads synchronously
    pub fn new() -> Self {
        Self {
            style_url: None,
            style_loaded: false,
            auto_load_styles: true,
            style_loads: 0,
            native_sources: Vec::new(),
            native_layers: Vec::new(),
            sources: HashMap::default(),
            layers: Vec::new(),
            handlers: Vec::new(),
            next_handler_id: 1,
            cursor: Cursor::Default,
            popups: Vec::new(),
            fits: Vec::new(),
            view: None,
        }
    }

    /// Sources and layers every loaded style brings along
    pub fn with_native_style(mut self, sources: &[&str], layers: &[LayerSpec]) -> Self {
        self.native_sources = sources
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    SourceSpec::Vector {
                        tiles: Vec::new(),
                        bounds: [-180.0, -85.0, 180.0, 85.0],
                        minzoom: 0,
                        maxzoom: 22,
                    },
                )
            })
            .collect();
        self.native_layers = layers.to_vec();
        self
    }

    /// When disabled, `set_style` leaves the renderer unloaded until
    /// [`finish_style_load`](Self::finish_style_load) is called
    pub fn with_auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load_styles = auto_load;
        self
    }

    pub fn set_auto_load(&mut self, auto_load: bool) {
        self.auto_load_styles = auto_load;
    }

    /// Completes a pending style load
    pub fn finish_style_load(&mut self) {
        if self.style_url.is_some() {
            self.reset_to_native_style();
            self.style_loaded = true;
            self.style_loads += 1;
        }
    }

    fn reset_to_native_style(&mut self) {
        self.sources = self.native_sources.iter().cloned().collect();
        self.layers = self.native_layers.clone();
    }

    fn ensure_loaded(&self, operation: &str) -> Result<()> {
        if self.style_loaded {
            Ok(())
        } else {
            Err(Error::Reconciliation(format!(
                "{}: style is not loaded yet",
                operation
            )))
        }
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::Reconciliation(format!("layer '{}' does not exist", id)))
    }

    /// Delivers a pointer event to the handlers registered for `layer_id`,
    /// applying cursor changes and popups, and returns what the handlers asked for
    pub fn dispatch(&mut self, layer_id: &str, event: &PointerEvent) -> Vec<Interaction> {
        let handlers: Vec<LayerEventHandler> = self
            .handlers
            .iter()
            .filter(|r| r.event == event.kind && r.layer_id == layer_id)
            .map(|r| r.handler.clone())
            .collect();

        let interactions: Vec<Interaction> = handlers.iter().filter_map(|h| h(event)).collect();
        for interaction in &interactions {
            match interaction {
                Interaction::SetCursor(cursor) => self.cursor = *cursor,
                Interaction::ShowPopup(popup) => self.popups.push(popup.clone()),
            }
        }
        interactions
    }

    /// Ids of all layers in draw order
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of handlers bound to `layer_id`
    pub fn handlers_on(&self, layer_id: &str) -> usize {
        self.handlers.iter().filter(|r| r.layer_id == layer_id).count()
    }

    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    pub fn fits(&self) -> &[(LatLngBounds, FitBoundsOptions)] {
        &self.fits
    }

    /// Center and zoom of the last `jump_to`
    pub fn view(&self) -> Option<(LatLng, f64)> {
        self.view
    }

    /// How many times a style finished loading
    pub fn style_loads(&self) -> usize {
        self.style_loads
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn set_style(&mut self, url: &str) -> Result<()> {
        log::debug!("headless: set_style {}", url);
        self.style_url = Some(url.to_string());
        self.sources.clear();
        self.layers.clear();
        self.style_loaded = false;
        if self.auto_load_styles {
            self.finish_style_load();
        }
        Ok(())
    }

    fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref()
    }

    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()> {
        self.ensure_loaded("add_source")?;
        if self.sources.contains_key(id) {
            return Err(Error::Reconciliation(format!(
                "there is already a source with id '{}'",
                id
            )));
        }
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if self.layers.iter().any(|l| l.source == id) {
            return Err(Error::Reconciliation(format!(
                "source '{}' is still used by a layer",
                id
            )));
        }
        self.sources.remove(id);
        Ok(())
    }

    fn get_source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        match self.sources.get_mut(id) {
            Some(SourceSpec::Geojson { data: current }) => {
                *current = data;
                Ok(())
            }
            Some(SourceSpec::Vector { .. }) => Err(Error::Reconciliation(format!(
                "source '{}' is not a GeoJSON source",
                id
            ))),
            None => Err(Error::Reconciliation(format!(
                "source '{}' does not exist",
                id
            ))),
        }
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        self.ensure_loaded("add_layer")?;
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(Error::Reconciliation(format!(
                "layer with id '{}' already exists",
                layer.id
            )));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(Error::Reconciliation(format!(
                "layer '{}' references missing source '{}'",
                layer.id, layer.source
            )));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.layers.retain(|l| l.id != id);
        Ok(())
    }

    fn get_layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        let layer = self.layer_mut(layer_id)?;
        if !layer.layout.is_object() {
            layer.layout = Value::Object(Default::default());
        }
        if let Value::Object(layout) = &mut layer.layout {
            layout.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        let layer = self.layer_mut(layer_id)?;
        if !layer.paint.is_object() {
            layer.paint = Value::Object(Default::default());
        }
        if let Value::Object(paint) = &mut layer.paint {
            paint.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn set_layer_filter(&mut self, layer_id: &str, filter: Option<Value>) -> Result<()> {
        self.layer_mut(layer_id)?.filter = filter;
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, options: FitBoundsOptions) {
        self.fits.push((bounds, options));
    }

    fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.view = Some((center, zoom));
    }

    fn on(
        &mut self,
        event: PointerEventKind,
        layer_id: &str,
        handler: LayerEventHandler,
    ) -> HandlerId {
        let id = HandlerId(self.next_handler_id);
        self.next_handler_id += 1;
        self.handlers.push(Registration {
            id,
            event,
            layer_id: layer_id.to_string(),
            handler,
        });
        id
    }

    fn off(&mut self, id: HandlerId) {
        self.handlers.retain(|r| r.id != id);
    }

    fn canvas_cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_canvas_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn show_popup(&mut self, popup: Popup) {
        self.popups.push(popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::hover_cursor_handler;
    use crate::rendering::LayerType;

    fn loaded() -> HeadlessRenderer {
        let mut renderer = HeadlessRenderer::new();
        renderer.set_style("style://light").unwrap();
        renderer
    }

    #[test]
    fn test_removal_of_missing_targets_is_not_an_error() {
        let mut renderer = loaded();
        assert!(renderer.remove_layer("nope").is_ok());
        assert!(renderer.remove_source("nope").is_ok());
        renderer.off(HandlerId(42));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut renderer = loaded();
        renderer
            .add_source("roadNetwork", SourceSpec::geojson(FeatureCollection::default()))
            .unwrap();
        let err = renderer
            .add_source("roadNetwork", SourceSpec::geojson(FeatureCollection::default()))
            .unwrap_err();
        assert!(matches!(err, Error::Reconciliation(_)));

        let layer = LayerSpec::new("roadNetworkLayer", LayerType::Line, "roadNetwork");
        renderer.add_layer(layer.clone()).unwrap();
        assert!(renderer.add_layer(layer).is_err());
    }

    #[test]
    fn test_adds_fail_before_style_load() {
        let mut renderer = HeadlessRenderer::new().with_auto_load(false);
        renderer.set_style("style://light").unwrap();
        assert!(!renderer.is_style_loaded());
        assert!(renderer
            .add_source("x", SourceSpec::geojson(FeatureCollection::default()))
            .is_err());

        renderer.finish_style_load();
        assert!(renderer
            .add_source("x", SourceSpec::geojson(FeatureCollection::default()))
            .is_ok());
    }

    #[test]
    fn test_style_swap_discards_custom_resources_but_keeps_native() {
        let poi = LayerSpec::new("poi_z14", LayerType::Symbol, "gallitiles");
        let mut renderer = HeadlessRenderer::new().with_native_style(&["gallitiles"], &[poi]);
        renderer.set_style("style://light").unwrap();
        renderer
            .add_source("wardBoundary", SourceSpec::geojson(FeatureCollection::default()))
            .unwrap();

        renderer.set_style("style://satellite").unwrap();
        assert!(renderer.get_source("wardBoundary").is_none());
        assert!(renderer.get_source("gallitiles").is_some());
        assert_eq!(renderer.layer_ids(), vec!["poi_z14"]);
        assert_eq!(renderer.style_loads(), 2);
    }

    #[test]
    fn test_dispatch_applies_cursor() {
        let mut renderer = loaded();
        renderer.on(
            PointerEventKind::MouseEnter,
            "parcelFillLayer",
            hover_cursor_handler(PointerEventKind::MouseEnter),
        );

        let event = PointerEvent::new(PointerEventKind::MouseEnter, LatLng::default());
        assert!(renderer.dispatch("otherLayer", &event).is_empty());
        assert_eq!(renderer.canvas_cursor(), Cursor::Default);

        renderer.dispatch("parcelFillLayer", &event);
        assert_eq!(renderer.canvas_cursor(), Cursor::Pointer);
    }
}
