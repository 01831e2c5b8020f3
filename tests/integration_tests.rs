use parcelmap::core::constants::{BASEMAP_TILE_SOURCE, TEMPLE_POI_LAYER_ID};
use parcelmap::layers::region::{CADASTRAL_LAYER_ID, CADASTRAL_SOURCE_ID};
use parcelmap::prelude::*;

/// End-to-end scenarios against the in-memory renderer and fetcher, driven the
/// way a UI shell drives the engine
#[cfg(test)]
mod integration_tests {
    use super::*;
    use parcelmap::rendering::LayerType;

    const GUTHI: &str = "गुठी";
    const GOVERNMENT: &str = "सरकारी";

    fn parcels(generation: Generation, labels: &[&str]) -> FeatureCollection {
        let key = generation.category_property();
        FeatureCollection::new(
            labels
                .iter()
                .map(|label| GeoJsonFeature::with_properties([(key.as_str(), *label)]))
                .collect(),
        )
    }

    fn galli_renderer() -> Rc<RefCell<HeadlessRenderer>> {
        let poi = |id: &str| LayerSpec::new(id, LayerType::Symbol, BASEMAP_TILE_SOURCE);
        Rc::new(RefCell::new(HeadlessRenderer::new().with_native_style(
            &[BASEMAP_TILE_SOURCE],
            &[poi("poi_z14"), poi("poi_z15"), poi("poi_transit")],
        )))
    }

    /// Fetcher with a payload for every static overlay
    fn seeded_fetcher(config: &SessionConfig) -> MemoryFetcher {
        let fetcher = MemoryFetcher::new();
        for kind in OverlayKind::STATIC {
            let Some(url) = config.data.url_for(kind) else {
                continue;
            };
            let payload = match kind {
                OverlayKind::Parcels2016 => {
                    parcels(Generation::Notice2016, &[GOVERNMENT, GUTHI, GUTHI])
                }
                OverlayKind::Parcels2019 => parcels(Generation::Notice2019, &[GUTHI, "अज्ञात"]),
                _ => FeatureCollection::new(vec![GeoJsonFeature::with_properties([(
                    "name", "feature",
                )])]),
            };
            fetcher.insert(url, payload);
        }
        fetcher
    }

    struct Harness {
        renderer: Rc<RefCell<HeadlessRenderer>>,
        fetcher: MemoryFetcher,
        manager: OverlayManager,
    }

    async fn started() -> Harness {
        let config = SessionConfig::default();
        let renderer = galli_renderer();
        let fetcher = seeded_fetcher(&config);
        let mut manager = OverlayManager::new(renderer.clone(), Arc::new(fetcher.clone()), config);
        manager.start().unwrap();
        manager.settle().await;
        Harness {
            renderer,
            fetcher,
            manager,
        }
    }

    fn source_len(renderer: &HeadlessRenderer, id: &str) -> usize {
        renderer
            .get_source(id)
            .and_then(SourceSpec::data)
            .map(FeatureCollection::len)
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_every_overlay_attaches_and_detaches() {
        let mut h = started().await;

        for kind in OverlayKind::STATIC {
            h.manager.set_visible(kind, true).unwrap();
        }
        h.manager.settle().await;

        for kind in OverlayKind::STATIC {
            let controller = h.manager.controller(kind).unwrap();
            let definition = controller.definition();
            assert!(controller.is_attached(), "{} not attached", kind);
            let renderer = h.renderer.borrow();
            assert!(renderer.get_source(definition.source_id).is_some());
            for layer_id in definition.layer_ids() {
                assert!(renderer.get_layer(layer_id).is_some(), "{}", layer_id);
            }
        }

        for kind in OverlayKind::STATIC {
            h.manager.set_visible(kind, false).unwrap();
        }

        let renderer = h.renderer.borrow();
        for kind in OverlayKind::STATIC {
            let controller = h.manager.controller(kind).unwrap();
            let definition = controller.definition();
            assert_eq!(controller.lifecycle(), LifecycleState::Detached);
            assert!(renderer.get_source(definition.source_id).is_none());
            for layer_id in definition.layer_ids() {
                assert!(renderer.get_layer(layer_id).is_none(), "{}", layer_id);
            }
        }
        assert_eq!(renderer.handler_count(), 0);
    }

    #[tokio::test]
    async fn test_showing_twice_adds_layers_once() {
        let mut h = started().await;
        let before = h.renderer.borrow().layer_ids().len();

        h.manager.set_visible(OverlayKind::RoadNetwork, true).unwrap();
        h.manager.set_visible(OverlayKind::RoadNetwork, true).unwrap();
        assert_eq!(h.manager.pending_fetches(), 1);
        h.manager.settle().await;
        h.manager.set_visible(OverlayKind::RoadNetwork, true).unwrap();

        let renderer = h.renderer.borrow();
        assert_eq!(renderer.layer_ids().len(), before + 1);
        assert_eq!(
            renderer
                .layer_ids()
                .iter()
                .filter(|id| **id == "roadNetworkLayer")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_late_response_does_not_reattach_hidden_overlay() {
        let mut h = started().await;

        h.manager.set_visible(OverlayKind::WaterResources, true).unwrap();
        assert_eq!(
            h.manager.lifecycle(OverlayKind::WaterResources),
            Some(LifecycleState::Fetching)
        );
        h.manager.set_visible(OverlayKind::WaterResources, false).unwrap();
        h.manager.settle().await;

        assert_eq!(
            h.manager.lifecycle(OverlayKind::WaterResources),
            Some(LifecycleState::Detached)
        );
        let renderer = h.renderer.borrow();
        assert!(renderer.get_source("waterResources").is_none());
        assert!(renderer.get_layer("waterResourcesFill").is_none());
    }

    #[tokio::test]
    async fn test_off_on_while_fetching_applies_only_latest_request() {
        let mut h = started().await;

        h.manager.set_visible(OverlayKind::BuildingFootprint, true).unwrap();
        h.manager.set_visible(OverlayKind::BuildingFootprint, false).unwrap();
        h.manager.set_visible(OverlayKind::BuildingFootprint, true).unwrap();
        assert_eq!(h.manager.pending_fetches(), 2);
        h.manager.settle().await;

        assert!(h.manager.is_attached(OverlayKind::BuildingFootprint));
        let renderer = h.renderer.borrow();
        assert_eq!(
            renderer
                .layer_ids()
                .iter()
                .filter(|id| id.starts_with("buildingFootprint"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_basemap_swap_reattaches_without_refetch() {
        let mut h = started().await;
        h.manager.set_visible(OverlayKind::WardBoundary, true).unwrap();
        h.manager.settle().await;
        assert!(h.manager.is_attached(OverlayKind::Parcels2016));
        assert!(h.manager.is_attached(OverlayKind::WardBoundary));
        let calls = h.fetcher.call_count();

        h.manager.toggle_basemap().unwrap();
        h.manager.settle().await;

        assert!(h.manager.is_satellite_active());
        assert!(h.manager.is_attached(OverlayKind::Parcels2016));
        assert!(h.manager.is_attached(OverlayKind::WardBoundary));
        assert_eq!(h.fetcher.call_count(), calls);
        let renderer = h.renderer.borrow();
        assert!(renderer.get_layer("parcelFillLayer").is_some());
        assert!(renderer.get_layer("wardBoundaryLayer").is_some());
        assert_eq!(renderer.handlers_on("parcelFillLayer"), 3);
    }

    #[tokio::test]
    async fn test_style_swap_keeps_applied_filter() {
        let mut h = started().await;
        h.manager.set_pending(FilterField::LandCategory, "guthi").unwrap();
        h.manager.apply_filters();
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 2);

        h.manager.toggle_basemap().unwrap();
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 2);
    }

    #[tokio::test]
    async fn test_pending_filter_takes_effect_only_when_applied() {
        let mut h = started().await;
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 3);

        h.manager.set_pending(FilterField::LandCategory, "government").unwrap();
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 3);

        h.manager.apply_filters();
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 1);

        h.manager.clear_filters();
        assert_eq!(source_len(&h.renderer.borrow(), "parcels"), 3);
    }

    #[tokio::test]
    async fn test_filter_reaches_both_parcel_generations() {
        let mut h = started().await;
        h.manager.set_visible(OverlayKind::Parcels2019, true).unwrap();
        h.manager.settle().await;
        let calls = h.fetcher.call_count();

        h.manager.set_pending(FilterField::LandCategory, "guthi").unwrap();
        h.manager.apply_filters();

        let renderer = h.renderer.borrow();
        assert_eq!(source_len(&renderer, "parcels"), 2);
        assert_eq!(source_len(&renderer, "parcels2019"), 1);
        assert_eq!(h.fetcher.call_count(), calls);
    }

    #[tokio::test]
    async fn test_region_selection_is_exclusive() {
        let mut h = started().await;

        h.manager.set_pending(FilterField::CadastralMap, "khokana").unwrap();
        h.manager.apply_filters();
        h.manager.set_pending(FilterField::CadastralMap, "sainbu").unwrap();
        h.manager.apply_filters();

        {
            let renderer = h.renderer.borrow();
            let cadastral: Vec<_> = renderer
                .layer_ids()
                .into_iter()
                .filter(|id| *id == CADASTRAL_LAYER_ID)
                .collect();
            assert_eq!(cadastral.len(), 1);
            let layer = renderer.get_layer(CADASTRAL_LAYER_ID).unwrap();
            assert_eq!(layer.source_layer.as_deref(), Some("public.sainbu"));
            match renderer.get_source(CADASTRAL_SOURCE_ID).unwrap() {
                SourceSpec::Vector { tiles, .. } => assert!(tiles[0].contains("public.sainbu")),
                other => panic!("unexpected source {:?}", other),
            }
            let (bounds, options) = renderer.fits().last().copied().unwrap();
            assert_eq!(bounds, RegionId::Sainbu.config().bounds);
            assert_eq!(options.padding, 50.0);
            assert_eq!(options.max_zoom, 16.0);
        }

        h.manager.clear_filters();
        assert!(h.renderer.borrow().get_source(CADASTRAL_SOURCE_ID).is_none());
        assert!(!h.manager.is_attached(OverlayKind::Cadastral));
    }

    #[tokio::test]
    async fn test_basemap_tuning_is_idempotent() {
        let mut h = started().await;
        h.manager.handle_style_data();
        h.manager.handle_style_data();
        h.manager.handle_style_loaded();

        let renderer = h.renderer.borrow();
        assert_eq!(
            renderer
                .layer_ids()
                .iter()
                .filter(|id| **id == TEMPLE_POI_LAYER_ID)
                .count(),
            1
        );
        assert!(!renderer.get_layer("poi_z15").unwrap().is_visible());
    }

    #[tokio::test]
    async fn test_swapping_back_retunes_basemap() {
        let mut h = started().await;
        h.manager.toggle_basemap().unwrap();
        h.manager.toggle_basemap().unwrap();

        let renderer = h.renderer.borrow();
        assert!(renderer.get_layer(TEMPLE_POI_LAYER_ID).is_some());
        assert!(!renderer.get_layer("poi_transit").unwrap().is_visible());
        assert!(h.manager.is_attached(OverlayKind::Parcels2016));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_overlay_detached() {
        let config = SessionConfig::default();
        let renderer = galli_renderer();
        let fetcher = seeded_fetcher(&config);
        let url = config.data.url_for(OverlayKind::HistoricalPlaces).unwrap();
        fetcher.remove(&url);
        let mut manager = OverlayManager::new(renderer.clone(), Arc::new(fetcher.clone()), config);
        manager.start().unwrap();

        manager.set_visible(OverlayKind::HistoricalPlaces, true).unwrap();
        manager.settle().await;
        assert_eq!(
            manager.lifecycle(OverlayKind::HistoricalPlaces),
            Some(LifecycleState::Detached)
        );
        assert!(renderer.borrow().get_source("historicalPlaces").is_none());
        assert!(manager.is_attached(OverlayKind::Parcels2016));

        // no automatic retry; showing again does
        let calls = fetcher.call_count();
        manager.settle().await;
        assert_eq!(fetcher.call_count(), calls);
        fetcher.insert(url, FeatureCollection::default());
        manager.set_visible(OverlayKind::HistoricalPlaces, true).unwrap();
        manager.settle().await;
        assert!(manager.is_attached(OverlayKind::HistoricalPlaces));
    }

    #[tokio::test]
    async fn test_parcel_click_opens_popup_with_placeholders() {
        let mut h = started().await;
        let generation = Generation::Notice2016;
        let feature = GeoJsonFeature::with_properties([
            (generation.category_property().as_str(), GUTHI),
            (
                format!("{}कित्ता नं.", generation.property_prefix()).as_str(),
                "412",
            ),
        ]);
        let at = LatLng::new(27.64, 85.29);

        let mut renderer = h.renderer.borrow_mut();
        renderer.dispatch(
            "parcelFillLayer",
            &PointerEvent::new(PointerEventKind::MouseEnter, at),
        );
        assert_eq!(renderer.canvas_cursor(), Cursor::Pointer);

        let interactions = renderer.dispatch(
            "parcelFillLayer",
            &PointerEvent::new(PointerEventKind::Click, at).with_features(vec![feature]),
        );
        assert_eq!(interactions.len(), 1);
        let popup = renderer.popups().last().unwrap();
        assert_eq!(popup.title, "Parcel Information");
        assert_eq!(popup.value("कित्ता नं."), Some("412"));
        assert_eq!(popup.value("जग्गाधनी"), Some(GUTHI));
        assert_eq!(popup.value("कैफियत"), Some("N/A"));

        renderer.dispatch(
            "parcelFillLayer",
            &PointerEvent::new(PointerEventKind::MouseLeave, at),
        );
        assert_eq!(renderer.canvas_cursor(), Cursor::Default);
        drop(renderer);

        h.manager.set_visible(OverlayKind::Parcels2016, false).unwrap();
        assert_eq!(h.renderer.borrow().handlers_on("parcelFillLayer"), 0);
    }

    #[tokio::test]
    async fn test_http_fetcher_reports_unreachable_hosts() {
        let fetcher = HttpFetcher::new();
        let result = fetcher.fetch("http://127.0.0.1:9/merge.geojson").await;
        assert!(matches!(result, Err(MapError::Network(_))));
    }
}
