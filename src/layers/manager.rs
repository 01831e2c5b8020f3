use crate::core::config::SessionConfig;
use crate::data::fetch::DataFetcher;
use crate::layers::basemap::BasemapStyleCoordinator;
use crate::layers::filter::{CategoryId, FilterSelection};
use crate::layers::lifecycle::{LifecycleState, OverlayController};
use crate::layers::region::RegionId;
use crate::layers::registry::{definitions, OverlayKind};
use crate::rendering::RendererHandle;
use crate::runtime::{FetchCompletion, FetchQueue};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Visibility flags the UI shell owns. The cadastral overlay has no flag of
/// its own; it follows the applied cadastral map filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    #[serde(rename = "wardBoundaryVisible")]
    pub ward_boundary: bool,
    #[serde(rename = "roadNetworkVisible")]
    pub road_network: bool,
    #[serde(rename = "waterResourcesVisible")]
    pub water_resources: bool,
    #[serde(rename = "parcelLayerVisible")]
    pub parcels_2016: bool,
    #[serde(rename = "parcelLayer2019Visible")]
    pub parcels_2019: bool,
    #[serde(rename = "buildingFootprintVisible")]
    pub building_footprint: bool,
    #[serde(rename = "historicalPlacesVisible")]
    pub historical_places: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            ward_boundary: false,
            road_network: false,
            water_resources: false,
            parcels_2016: true,
            parcels_2019: false,
            building_footprint: false,
            historical_places: false,
        }
    }
}

impl LayerVisibility {
    /// `None` for overlays without a visibility flag
    pub fn get(&self, kind: OverlayKind) -> Option<bool> {
        match kind {
            OverlayKind::WardBoundary => Some(self.ward_boundary),
            OverlayKind::RoadNetwork => Some(self.road_network),
            OverlayKind::WaterResources => Some(self.water_resources),
            OverlayKind::Parcels2016 => Some(self.parcels_2016),
            OverlayKind::Parcels2019 => Some(self.parcels_2019),
            OverlayKind::BuildingFootprint => Some(self.building_footprint),
            OverlayKind::HistoricalPlaces => Some(self.historical_places),
            OverlayKind::Cadastral => None,
        }
    }

    fn flag_mut(&mut self, kind: OverlayKind) -> Option<&mut bool> {
        match kind {
            OverlayKind::WardBoundary => Some(&mut self.ward_boundary),
            OverlayKind::RoadNetwork => Some(&mut self.road_network),
            OverlayKind::WaterResources => Some(&mut self.water_resources),
            OverlayKind::Parcels2016 => Some(&mut self.parcels_2016),
            OverlayKind::Parcels2019 => Some(&mut self.parcels_2019),
            OverlayKind::BuildingFootprint => Some(&mut self.building_footprint),
            OverlayKind::HistoricalPlaces => Some(&mut self.historical_places),
            OverlayKind::Cadastral => None,
        }
    }
}

/// Filter form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    CadastralMap,
    LandCategory,
}

/// Owns one controller per overlay kind and routes UI changes, basemap
/// swaps and fetch completions to them.
pub struct OverlayManager {
    renderer: RendererHandle,
    config: SessionConfig,
    controllers: Vec<OverlayController>,
    basemap: BasemapStyleCoordinator,
    queue: FetchQueue,
    visibility: LayerVisibility,
    pending: FilterSelection,
    applied: FilterSelection,
    ready: bool,
}

impl OverlayManager {
    pub fn new(
        renderer: RendererHandle,
        fetcher: Arc<dyn DataFetcher>,
        config: SessionConfig,
    ) -> Self {
        let controllers = definitions(&config.data)
            .into_iter()
            .map(|definition| OverlayController::new(definition, renderer.clone()))
            .collect();
        let basemap = BasemapStyleCoordinator::new(renderer.clone(), &config);

        Self {
            renderer,
            config,
            controllers,
            basemap,
            queue: FetchQueue::new(fetcher),
            visibility: LayerVisibility::default(),
            pending: FilterSelection::default(),
            applied: FilterSelection::default(),
            ready: false,
        }
    }

    /// Replaces the fetch queue, e.g. to add a timeout
    pub fn with_queue(mut self, queue: FetchQueue) -> Self {
        self.queue = queue;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn renderer(&self) -> &RendererHandle {
        &self.renderer
    }

    /// Loads the initial basemap and view. Overlays attach once the style
    /// reports loaded.
    pub fn start(&mut self) -> Result<()> {
        let view = &self.config.initial_view;
        self.renderer.borrow_mut().jump_to(view.center(), view.zoom);
        self.basemap.load_initial()?;
        self.after_style_request();
        Ok(())
    }

    /// To be called when the renderer fires its style load event
    pub fn handle_style_loaded(&mut self) {
        self.handle_style_data();

        if !self.ready {
            self.ready = true;
            log::info!("map ready, syncing overlays");
            for kind in OverlayKind::STATIC {
                if let Some(visible) = self.visibility.get(kind) {
                    self.drive(kind, visible);
                }
            }
            self.propagate_filters();
            return;
        }

        if self.basemap.take_pending_swap() {
            log::info!("basemap replaced, re-attaching overlays");
            for controller in &mut self.controllers {
                if let Err(e) = controller.on_basemap_style_changed() {
                    log::error!("{}: re-attach failed: {}", controller.kind(), e);
                }
            }
        }
    }

    /// To be called on every style data event; only tunes the basemap
    pub fn handle_style_data(&mut self) {
        if let Err(e) = self.basemap.tune_basemap() {
            log::error!("basemap tuning failed: {}", e);
        }
    }

    pub fn toggle_basemap(&mut self) -> Result<()> {
        self.basemap.toggle()?;
        self.after_style_request();
        Ok(())
    }

    pub fn is_satellite_active(&self) -> bool {
        self.basemap.is_satellite_active()
    }

    fn after_style_request(&mut self) {
        // renderers that load synchronously never fire a separate event
        let loaded = self.renderer.borrow().is_style_loaded();
        if loaded {
            self.handle_style_loaded();
        }
    }

    pub fn visibility(&self) -> LayerVisibility {
        self.visibility
    }

    /// Shows or hides one overlay
    pub fn set_visible(&mut self, kind: OverlayKind, visible: bool) -> Result<()> {
        let flag = self.visibility.flag_mut(kind).ok_or_else(|| {
            Error::Config(format!(
                "{} has no visibility flag, select a cadastral map instead",
                kind
            ))
        })?;
        *flag = visible;
        if self.ready {
            self.drive(kind, visible);
        }
        Ok(())
    }

    /// Applies a full set of visibility flags, touching only overlays that changed
    pub fn sync_visibility(&mut self, visibility: LayerVisibility) {
        for kind in OverlayKind::STATIC {
            let Some(visible) = visibility.get(kind) else {
                continue;
            };
            if self.visibility.get(kind) == Some(visible) {
                continue;
            }
            if let Err(e) = self.set_visible(kind, visible) {
                log::error!("{}: {}", kind, e);
            }
        }
    }

    pub fn pending_filters(&self) -> FilterSelection {
        self.pending
    }

    pub fn applied_filters(&self) -> FilterSelection {
        self.applied
    }

    /// Edits the pending selection. An empty value clears the field.
    pub fn set_pending(&mut self, field: FilterField, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            FilterField::CadastralMap => {
                self.pending.cadastral_map = if value.is_empty() {
                    None
                } else {
                    Some(value.parse::<RegionId>()?)
                };
            }
            FilterField::LandCategory => {
                self.pending.land_category = if value.is_empty() {
                    None
                } else {
                    Some(value.parse::<CategoryId>()?)
                };
            }
        }
        Ok(())
    }

    /// Copies the pending selection to the applied one and propagates it
    pub fn apply_filters(&mut self) {
        self.set_applied_filters(self.pending);
    }

    /// Resets both selections and propagates immediately
    pub fn clear_filters(&mut self) {
        self.pending = FilterSelection::default();
        self.set_applied_filters(FilterSelection::default());
    }

    /// Propagates an applied selection coming from outside the pending form
    pub fn set_applied_filters(&mut self, selection: FilterSelection) {
        self.applied = selection;
        log::debug!("applied filters {:?}", selection);
        if self.ready {
            self.propagate_filters();
        }
    }

    fn propagate_filters(&mut self) {
        let selection = self.applied;
        for controller in &mut self.controllers {
            if let Err(e) = controller.apply_filter(selection) {
                log::error!("{}: filter failed: {}", controller.kind(), e);
            }
        }
    }

    fn drive(&mut self, kind: OverlayKind, visible: bool) {
        let Some(controller) = self.controllers.iter_mut().find(|c| c.kind() == kind) else {
            return;
        };
        match controller.set_visible(visible) {
            Ok(Some(request)) => self.queue.submit(request),
            Ok(None) => {}
            Err(e) => log::error!("{}: {}", kind, e),
        }
    }

    /// Waits for every outstanding fetch and applies the results
    pub async fn settle(&mut self) {
        while let Some(completion) = self.queue.next().await {
            self.deliver(completion);
        }
    }

    /// Applies fetch results that are already available, without waiting
    pub fn poll_fetches(&mut self) -> usize {
        let ready = self.queue.drain_ready();
        let count = ready.len();
        for completion in ready {
            self.deliver(completion);
        }
        count
    }

    pub fn pending_fetches(&self) -> usize {
        self.queue.len()
    }

    fn deliver(&mut self, completion: FetchCompletion) {
        let FetchCompletion {
            kind,
            token,
            result,
        } = completion;
        let Some(controller) = self.controllers.iter_mut().find(|c| c.kind() == kind) else {
            return;
        };
        if let Err(e) = controller.complete_fetch(token, result) {
            log::error!("{}: {}", kind, e);
        }
    }

    pub fn controller(&self, kind: OverlayKind) -> Option<&OverlayController> {
        self.controllers.iter().find(|c| c.kind() == kind)
    }

    pub fn lifecycle(&self, kind: OverlayKind) -> Option<LifecycleState> {
        self.controller(kind).map(OverlayController::lifecycle)
    }

    pub fn is_attached(&self, kind: OverlayKind) -> bool {
        self.controller(kind)
            .map(OverlayController::is_attached)
            .unwrap_or(false)
    }

    /// Removes every overlay from the renderer and drops outstanding fetches
    pub fn teardown(&mut self) {
        self.queue.clear();
        for controller in &mut self.controllers {
            controller.teardown();
        }
        self.ready = false;
        log::info!("overlays torn down");
    }
}
