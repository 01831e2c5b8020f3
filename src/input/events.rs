use crate::core::geo::LatLng;
use crate::data::geojson::GeoJsonFeature;
use crate::ui::popup::Popup;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Pointer events a renderer delivers to handlers scoped to one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventKind {
    Click,
    MouseEnter,
    MouseLeave,
}

impl std::fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointerEventKind::Click => write!(f, "click"),
            PointerEventKind::MouseEnter => write!(f, "mouseenter"),
            PointerEventKind::MouseLeave => write!(f, "mouseleave"),
        }
    }
}

/// A pointer event together with the rendered features under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub lng_lat: LatLng,
    pub features: Vec<GeoJsonFeature>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, lng_lat: LatLng) -> Self {
        Self {
            kind,
            lng_lat,
            features: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<GeoJsonFeature>) -> Self {
        self.features = features;
        self
    }
}

/// Canvas cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// What a layer handler asks the renderer host to do in response to an event
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    SetCursor(Cursor),
    ShowPopup(Popup),
}

/// Opaque id returned when registering a handler, used to unregister it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

/// Layer-scoped event handler. Handlers only describe their effect and never
/// hold the renderer, so dropping the registration drops everything they captured.
pub type LayerEventHandler = Rc<dyn Fn(&PointerEvent) -> Option<Interaction>>;

/// Cursor feedback for hoverable layers
pub fn hover_cursor_handler(kind: PointerEventKind) -> LayerEventHandler {
    Rc::new(move |_event: &PointerEvent| match kind {
        PointerEventKind::MouseEnter => Some(Interaction::SetCursor(Cursor::Pointer)),
        PointerEventKind::MouseLeave => Some(Interaction::SetCursor(Cursor::Default)),
        PointerEventKind::Click => None,
    })
}
