use crate::core::constants::NOT_AVAILABLE;
use crate::core::geo::LatLng;
use crate::data::geojson::GeoJsonFeature;
use crate::input::events::{Interaction, LayerEventHandler, PointerEvent};
use std::fmt;
use std::rc::Rc;

/// One row of a popup table: a display label and the property it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupField {
    pub label: String,
    pub property: String,
}

impl PopupField {
    pub fn new(label: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: property.into(),
        }
    }
}

/// Fixed field-label → property table for one overlay kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupTemplate {
    pub title: String,
    pub fields: Vec<PopupField>,
}

impl PopupTemplate {
    pub fn new(title: impl Into<String>, fields: Vec<PopupField>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }

    /// Fills the template from a feature's properties
    pub fn render(&self, feature: &GeoJsonFeature, position: LatLng) -> Popup {
        let rows = self
            .fields
            .iter()
            .map(|field| {
                let value = feature
                    .property(&field.property)
                    .and_then(display_value)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (field.label.clone(), value)
            })
            .collect();

        Popup {
            position,
            title: self.title.clone(),
            rows,
        }
    }

    /// Click handler that opens this template for the first feature hit
    pub fn click_handler(self: Rc<Self>) -> LayerEventHandler {
        let template = self;
        Rc::new(move |event: &PointerEvent| {
            let feature = event.features.first()?;
            Some(Interaction::ShowPopup(template.render(feature, event.lng_lat)))
        })
    }
}

/// Null and empty strings count as missing; other scalars are shown as written.
fn display_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A rendered popup anchored at a map position
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub position: LatLng,
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Popup {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// HTML fragment for hosts that display popups in a DOM
    pub fn to_html(&self) -> String {
        let mut html = format!("<div><h3>{}</h3>", escape_html(&self.title));
        for (label, value) in &self.rows {
            html.push_str(&format!(
                "<p>{}: {}</p>",
                escape_html(label),
                escape_html(value)
            ));
        }
        html.push_str("</div>");
        html
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for (label, value) in &self.rows {
            writeln!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
