//! Overlay registry
//!
//! One immutable [`OverlayDefinition`] per overlay kind: where its data comes
//! from, the source id and style layers it reserves, which layer is
//! interactive and what its popup shows. The lifecycle controller is generic
//! over these definitions; nothing else distinguishes one overlay from another.

use crate::core::config::DataEndpoints;
use crate::layers::filter::{fill_color_expression, Generation};
use crate::layers::region::{CADASTRAL_LAYER_ID, CADASTRAL_SOURCE_ID};
use crate::rendering::{LayerSpec, LayerType};
use crate::ui::popup::{PopupField, PopupTemplate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::rc::Rc;

/// Every overlay the map can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OverlayKind {
    WardBoundary,
    RoadNetwork,
    Parcels2016,
    Parcels2019,
    BuildingFootprint,
    WaterResources,
    HistoricalPlaces,
    Cadastral,
}

impl OverlayKind {
    /// Overlays backed by a static feature collection, in draw order
    pub const STATIC: [OverlayKind; 7] = [
        OverlayKind::WardBoundary,
        OverlayKind::RoadNetwork,
        OverlayKind::Parcels2016,
        OverlayKind::Parcels2019,
        OverlayKind::BuildingFootprint,
        OverlayKind::WaterResources,
        OverlayKind::HistoricalPlaces,
    ];

    pub const ALL: [OverlayKind; 8] = [
        OverlayKind::WardBoundary,
        OverlayKind::RoadNetwork,
        OverlayKind::Parcels2016,
        OverlayKind::Parcels2019,
        OverlayKind::BuildingFootprint,
        OverlayKind::WaterResources,
        OverlayKind::HistoricalPlaces,
        OverlayKind::Cadastral,
    ];
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayKind::WardBoundary => "ward-boundary",
            OverlayKind::RoadNetwork => "road-network",
            OverlayKind::Parcels2016 => "parcels-2016",
            OverlayKind::Parcels2019 => "parcels-2019",
            OverlayKind::BuildingFootprint => "building-footprint",
            OverlayKind::WaterResources => "water-resources",
            OverlayKind::HistoricalPlaces => "historical-places",
            OverlayKind::Cadastral => "cadastral",
        };
        f.write_str(name)
    }
}

/// Where an overlay's renderer source comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// One feature collection fetched from a URL
    StaticFile { url: String },
    /// Per-region vector tiles supplied by the region provider
    RegionTiled,
}

/// Immutable description of one overlay kind
#[derive(Debug, Clone)]
pub struct OverlayDefinition {
    pub kind: OverlayKind,
    pub source_id: &'static str,
    pub data_source: DataSource,
    /// Style layers added on attach, bottom to top. Region-tiled overlays get
    /// their single layer from the region provider instead.
    pub layers: Vec<LayerSpec>,
    /// Layer that receives hover and click handlers
    pub interactive_layer: Option<&'static str>,
    pub popup: Option<Rc<PopupTemplate>>,
    /// Parcel generation, for overlays that support land-category filtering
    pub category_filter: Option<Generation>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Log a warning when an attach finds no features
    pub warn_when_empty: bool,
}

impl OverlayDefinition {
    fn new(kind: OverlayKind, source_id: &'static str, data_source: DataSource) -> Self {
        Self {
            kind,
            source_id,
            data_source,
            layers: Vec::new(),
            interactive_layer: None,
            popup: None,
            category_filter: None,
            min_zoom: None,
            max_zoom: None,
            warn_when_empty: false,
        }
    }

    fn layer(mut self, layer: LayerSpec) -> Self {
        self.layers.push(layer);
        self
    }

    fn interactive(mut self, layer_id: &'static str, popup: PopupTemplate) -> Self {
        self.interactive_layer = Some(layer_id);
        self.popup = Some(Rc::new(popup));
        self
    }

    /// Builds the definition for `kind`, resolving static URLs against `endpoints`
    pub fn for_kind(kind: OverlayKind, endpoints: &DataEndpoints) -> Self {
        let data_source = match endpoints.url_for(kind) {
            Some(url) => DataSource::StaticFile { url },
            None => DataSource::RegionTiled,
        };

        match kind {
            OverlayKind::WardBoundary => Self::new(kind, "wardBoundary", data_source).layer(
                LayerSpec::new("wardBoundaryLayer", LayerType::Line, "wardBoundary").with_paint(
                    json!({
                        "line-color": "#ff0000",
                        "line-width": 3,
                    }),
                ),
            ),
            OverlayKind::RoadNetwork => Self::new(kind, "roadNetwork", data_source).layer(
                LayerSpec::new("roadNetworkLayer", LayerType::Line, "roadNetwork")
                    .with_layout(json!({
                        "line-join": "round",
                        "line-cap": "round",
                    }))
                    .with_paint(json!({
                        "line-color": "#ff4f00",
                        "line-width": [
                            "match",
                            ["get", "road_type"],
                            "highway", 4,
                            "main_road", 3,
                            "secondary_road", 2,
                            1.5
                        ],
                    })),
            ),
            OverlayKind::Parcels2016 => {
                parcel_definition(kind, data_source, Generation::Notice2016)
            }
            OverlayKind::Parcels2019 => {
                parcel_definition(kind, data_source, Generation::Notice2019)
            }
            OverlayKind::BuildingFootprint => Self::new(kind, "buildingFootprint", data_source)
                .layer(
                    LayerSpec::new("buildingFootprintFill", LayerType::Fill, "buildingFootprint")
                        .with_paint(json!({
                            "fill-color": "#8a2be2",
                            "fill-opacity": 0.5,
                        })),
                )
                .layer(
                    LayerSpec::new(
                        "buildingFootprintOutline",
                        LayerType::Line,
                        "buildingFootprint",
                    )
                    .with_paint(json!({
                        "line-color": "#4a148c",
                        "line-width": 1,
                    })),
                ),
            OverlayKind::WaterResources => Self::new(kind, "waterResources", data_source)
                .layer(
                    LayerSpec::new("waterResourcesFill", LayerType::Fill, "waterResources")
                        .with_filter(json!(["==", ["geometry-type"], "Polygon"]))
                        .with_paint(json!({
                            "fill-color": "#4FC3F7",
                            "fill-opacity": 0.7,
                        })),
                )
                .layer(
                    LayerSpec::new("waterResourcesOutline", LayerType::Line, "waterResources")
                        .with_filter(json!(["==", ["geometry-type"], "Polygon"]))
                        .with_paint(json!({
                            "line-color": "#0288D1",
                            "line-width": 1,
                        })),
                ),
            OverlayKind::HistoricalPlaces => {
                let mut definition = Self::new(kind, "historicalPlaces", data_source)
                    .layer(
                        LayerSpec::new("historicalPlacesSymbol", LayerType::Circle, "historicalPlaces")
                            .with_layout(json!({ "visibility": "visible" }))
                            .with_paint(json!({
                                "circle-radius": 6,
                                "circle-color": "#FF6B6B",
                                "circle-stroke-width": 2,
                                "circle-stroke-color": "#D32F2F",
                            })),
                    )
                    .layer(
                        LayerSpec::new("historicalPlacesLabels", LayerType::Symbol, "historicalPlaces")
                            .with_layout(json!({
                                "text-field": ["get", "name"],
                                "text-font": ["Open Sans Regular"],
                                "text-offset": [0, 1.25],
                                "text-anchor": "top",
                                "text-size": 12,
                                "text-allow-overlap": false,
                            }))
                            .with_paint(json!({
                                "text-color": "#000000",
                                "text-halo-color": "#FFFFFF",
                                "text-halo-width": 2,
                            })),
                    )
                    .interactive(
                        "historicalPlacesSymbol",
                        PopupTemplate::new(
                            "Historical Place Information",
                            vec![
                                PopupField::new("Name", "Name"),
                                PopupField::new("Description", "description"),
                            ],
                        ),
                    );
                definition.warn_when_empty = true;
                definition
            }
            OverlayKind::Cadastral => Self::new(kind, CADASTRAL_SOURCE_ID, DataSource::RegionTiled),
        }
    }

    /// Every renderer layer id this overlay may own
    pub fn layer_ids(&self) -> Vec<&str> {
        if self.data_source == DataSource::RegionTiled {
            return vec![CADASTRAL_LAYER_ID];
        }
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    /// Style layers with the definition's zoom range applied
    pub fn style_layers(&self) -> Vec<LayerSpec> {
        self.layers
            .iter()
            .cloned()
            .map(|layer| {
                if self.min_zoom.is_some() || self.max_zoom.is_some() {
                    layer.with_zoom_range(self.min_zoom, self.max_zoom)
                } else {
                    layer
                }
            })
            .collect()
    }
}

/// Popup rows shared by both parcel generations: label and property suffix
const PARCEL_POPUP_FIELDS: [(&str, &str); 19] = [
    ("जग्गाधनीको नाम", "जग्गाधनीको नाम"),
    ("जग्गाधनीको बाबुको नाम", "जग्गाधनीको बाबुको नाम"),
    ("जग्गाधनीको बाजेको नाम", "जग्गाधनीको बाजेको नाम"),
    ("साविक ठेगाना / गा.वि.स.", "साविक ठेगाना÷ गा.वि.स."),
    ("वार्ड नं.", "वार्ड नं."),
    ("सिट नं.", "सिट नं."),
    ("कित्ता नं.", "कित्ता नं."),
    ("श्रेस्ता अनुसारको क्षेत्रफल ब.मि.", "ब.मि."),
    ("श्रेस्ता अनुसारको क्षेत्रफल रो", "श्रेस्ता अनुसारको क्षेत्रफल११रो"),
    ("श्रेस्ता अनुसारको क्षेत्रफल आ", "श्रेस्ता अनुसारको क्षेत्रफले१२आ"),
    ("श्रेस्ता अनुसारको क्षेत्रफल पै", "श्रेस्ता अनुसारको क्षेत्रफलेपै"),
    ("श्रेस्ता अनुसारको क्षेत्रफल दा", "श्रेस्ता अनुसारको क्षेत्रफले१३दा"),
    ("अधिग्रहण गरिने क्षेत्रफल ब.मि.", "ब.मि._1"),
    ("अधिग्रहण गरिने क्षेत्रफल रो", "अधिग्रहम गरिने क्षेत्रफल१६रो"),
    ("अधिग्रहण गरिने क्षेत्रफल आ", "अधिग्रहम गरिने क्षेत्रफल१७आ"),
    ("अधिग्रहण गरिने क्षेत्रफल पै", "अधिग्रहम गरिने क्षेत्रफलपै"),
    ("अधिग्रहण गरिने क्षेत्रफल दा", "अधिग्रहम गरिने क्षेत्रफल१८।००दा"),
    ("कैफियत", "कैफियत"),
    ("जग्गाधनी", "जग्गाधनी"),
];

fn parcel_definition(
    kind: OverlayKind,
    data_source: DataSource,
    generation: Generation,
) -> OverlayDefinition {
    let (source_id, fill_id, border_id, title) = match generation {
        Generation::Notice2016 => (
            "parcels",
            "parcelFillLayer",
            "parcelBorderLayer",
            "Parcel Information",
        ),
        Generation::Notice2019 => (
            "parcels2019",
            "parcel2019FillLayer",
            "parcel2019BorderLayer",
            "2019 Parcel Information",
        ),
    };

    let border_paint = match generation {
        Generation::Notice2016 => json!({
            "line-color": "#100c08",
            "line-width": 0.5,
        }),
        Generation::Notice2019 => json!({
            "line-color": "#100c08",
            "line-width": 2,
            "line-dasharray": [2, 2],
        }),
    };

    let mut fields: Vec<PopupField> = PARCEL_POPUP_FIELDS
        .iter()
        .map(|(label, suffix)| {
            PopupField::new(*label, format!("{}{}", generation.property_prefix(), suffix))
        })
        .collect();
    fields.push(PopupField::new(
        "Land Acquisition Notice",
        generation.notice_property(),
    ));

    let mut definition = OverlayDefinition::new(kind, source_id, data_source)
        .layer(
            LayerSpec::new(fill_id, LayerType::Fill, source_id).with_paint(json!({
                "fill-color": fill_color_expression(generation),
                "fill-opacity": 0.5,
            })),
        )
        .layer(LayerSpec::new(border_id, LayerType::Line, source_id).with_paint(border_paint))
        .interactive(fill_id, PopupTemplate::new(title, fields));
    definition.category_filter = Some(generation);
    definition
}

/// Definitions for every overlay kind
pub fn definitions(endpoints: &DataEndpoints) -> Vec<OverlayDefinition> {
    OverlayKind::ALL
        .into_iter()
        .map(|kind| OverlayDefinition::for_kind(kind, endpoints))
        .collect()
}
