//! Per-region cadastral overlays
//!
//! Each survey region is published as its own tiled vector dataset. All regions
//! share one reserved source/layer identifier pair, so at most one region can be
//! on the map at a time.

use crate::core::constants::{REGION_FIT_MAX_ZOOM, REGION_FIT_PADDING};
use crate::core::geo::{LatLng, LatLngBounds};
use crate::rendering::{FitBoundsOptions, LayerSpec, LayerType, SourceSpec};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

pub const CADASTRAL_SOURCE_ID: &str = "cadastralMapSource";
pub const CADASTRAL_LAYER_ID: &str = "cadastralMapLayer";

/// Named cadastral survey region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionId {
    Khokana,
    Sainbu,
    Bungamati,
}

impl RegionId {
    pub const ALL: [RegionId; 3] = [RegionId::Khokana, RegionId::Sainbu, RegionId::Bungamati];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionId::Khokana => "khokana",
            RegionId::Sainbu => "sainbu",
            RegionId::Bungamati => "bungamati",
        }
    }

    pub fn config(&self) -> &'static RegionConfig {
        match self {
            RegionId::Khokana => &KHOKANA,
            RegionId::Sainbu => &SAINBU,
            RegionId::Bungamati => &BUNGAMATI,
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::UnknownRegion(s.to_string()))
    }
}

/// Static description of one region's tiled dataset
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub tile_url: &'static str,
    pub source_layer: &'static str,
    /// `[lng, lat]`
    pub center: [f64; 2],
    pub bounds: LatLngBounds,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl RegionConfig {
    pub fn center(&self) -> LatLng {
        LatLng::from_lng_lat(self.center)
    }
}

static KHOKANA: RegionConfig = RegionConfig {
    tile_url: "https://tiles.gallimap.com/public.khokana/{z}/{x}/{y}.pbf",
    source_layer: "public.khokana",
    center: [85.29322814941406, 27.641535758972168],
    bounds: LatLngBounds::from_wsen([
        85.2823257446289,
        27.62953758239746,
        85.30413055419922,
        27.653533935546875,
    ]),
    min_zoom: 0,
    max_zoom: 22,
};

static SAINBU: RegionConfig = RegionConfig {
    tile_url: "https://tiles.gallimap.com/public.sainbu/{z}/{x}/{y}.pbf",
    source_layer: "public.sainbu",
    center: [85.30310440063477, 27.648791313171387],
    bounds: LatLngBounds::from_wsen([
        85.29135131835938,
        27.631587982177734,
        85.31485748291016,
        27.66599464416504,
    ]),
    min_zoom: 0,
    max_zoom: 22,
};

static BUNGAMATI: RegionConfig = RegionConfig {
    tile_url: "https://tiles.gallimap.com/public.bungamati/{z}/{x}/{y}.pbf",
    source_layer: "public.bungamati",
    center: [85.30072021484375, 27.61996555328369],
    bounds: LatLngBounds::from_wsen([
        85.2900161743164,
        27.60451889038086,
        85.3114242553711,
        27.635412216186523,
    ]),
    min_zoom: 0,
    max_zoom: 22,
};

/// Viewport change issued once after a region attaches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitCommand {
    pub bounds: LatLngBounds,
    pub options: FitBoundsOptions,
}

/// Everything needed to put one region on the map
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOverlay {
    pub region: RegionId,
    pub source_id: &'static str,
    pub source: SourceSpec,
    pub layer: LayerSpec,
    pub fit: FitCommand,
}

/// Builds renderer descriptors for cadastral regions
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionOverlayProvider;

impl RegionOverlayProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn provide(&self, region: RegionId) -> RegionOverlay {
        let config = region.config();
        let source = SourceSpec::Vector {
            tiles: vec![config.tile_url.to_string()],
            bounds: config.bounds.to_wsen(),
            minzoom: config.min_zoom,
            maxzoom: config.max_zoom,
        };
        let layer = LayerSpec::new(CADASTRAL_LAYER_ID, LayerType::Line, CADASTRAL_SOURCE_ID)
            .with_source_layer(config.source_layer)
            .with_paint(json!({
                "line-color": "#000000",
                "line-width": 1,
            }));

        RegionOverlay {
            region,
            source_id: CADASTRAL_SOURCE_ID,
            source,
            layer,
            fit: FitCommand {
                bounds: config.bounds,
                options: FitBoundsOptions {
                    padding: REGION_FIT_PADDING,
                    max_zoom: REGION_FIT_MAX_ZOOM,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_region_shares_reserved_ids() {
        let provider = RegionOverlayProvider::new();
        for region in RegionId::ALL {
            let overlay = provider.provide(region);
            assert_eq!(overlay.source_id, CADASTRAL_SOURCE_ID);
            assert_eq!(overlay.layer.id, CADASTRAL_LAYER_ID);
            assert_eq!(overlay.layer.source, CADASTRAL_SOURCE_ID);
            assert_eq!(
                overlay.layer.source_layer.as_deref(),
                Some(region.config().source_layer)
            );
        }
    }

    #[test]
    fn test_fit_command_uses_fixed_padding_and_zoom() {
        let overlay = RegionOverlayProvider::new().provide(RegionId::Sainbu);
        assert_eq!(overlay.fit.options.padding, 50.0);
        assert_eq!(overlay.fit.options.max_zoom, 16.0);
        assert_eq!(overlay.fit.bounds, RegionId::Sainbu.config().bounds);
    }

    #[test]
    fn test_center_lies_inside_bounds() {
        for region in RegionId::ALL {
            let config = region.config();
            assert!(config.bounds.contains(&config.center()), "{}", region);
        }
    }

    #[test]
    fn test_region_ids_parse() {
        assert_eq!("bungamati".parse::<RegionId>().unwrap(), RegionId::Bungamati);
        assert!(matches!(
            "kirtipur".parse::<RegionId>(),
            Err(Error::UnknownRegion(_))
        ));
    }
}
