//! Overlay lifecycle controller
//!
//! One [`OverlayController`] drives one overlay kind through
//! `Detached → Fetching → Attached → Detached`, with a transient `Reattaching`
//! state while a basemap style swap is being repaired. Every attach removes the
//! overlay's reserved source and layers first, so a reconciliation can run any
//! number of times without tripping duplicate-id errors in the renderer.
//!
//! Fetches are not performed here. [`OverlayController::set_visible`] hands out a
//! [`FetchRequest`] stamped with the controller's current token, and the result
//! comes back through [`OverlayController::complete_fetch`]. Any change of
//! desired state bumps the token, so results of superseded requests are dropped.

use crate::data::geojson::FeatureCollection;
use crate::input::events::{hover_cursor_handler, HandlerId, PointerEventKind};
use crate::layers::filter::{resolve, unmapped_labels, FilterSelection};
use crate::layers::region::{RegionId, RegionOverlayProvider};
use crate::layers::registry::{DataSource, OverlayDefinition, OverlayKind};
use crate::rendering::{RendererHandle, SourceSpec};
use crate::{Error, Result};
use std::fmt;

/// Where an overlay is in its attach cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Detached,
    Fetching,
    Attached,
    Reattaching,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Detached => "DETACHED",
            LifecycleState::Fetching => "FETCHING",
            LifecycleState::Attached => "ATTACHED",
            LifecycleState::Reattaching => "REATTACHING",
        };
        f.write_str(name)
    }
}

/// Mutable per-overlay session state
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub kind: OverlayKind,
    pub visible: bool,
    pub attached: bool,
    /// Raw payload of the last successful fetch, reused on re-show and style swaps
    pub last_fetched_data: Option<FeatureCollection>,
    pub active_region: Option<RegionId>,
    pub active_filter: Option<FilterSelection>,
}

impl OverlayState {
    fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            visible: false,
            attached: false,
            last_fetched_data: None,
            active_region: None,
            active_filter: None,
        }
    }
}

/// A fetch the controller is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: OverlayKind,
    pub token: u64,
    pub url: String,
}

/// Keeps one overlay's renderer resources in line with its desired state
pub struct OverlayController {
    definition: OverlayDefinition,
    renderer: RendererHandle,
    regions: RegionOverlayProvider,
    state: OverlayState,
    lifecycle: LifecycleState,
    token: u64,
    handlers: Vec<HandlerId>,
    /// Set when a newly selected region has not been fitted yet
    fit_pending: bool,
}

impl OverlayController {
    pub fn new(definition: OverlayDefinition, renderer: RendererHandle) -> Self {
        let state = OverlayState::new(definition.kind);
        Self {
            definition,
            renderer,
            regions: RegionOverlayProvider::new(),
            state,
            lifecycle: LifecycleState::Detached,
            token: 0,
            handlers: Vec::new(),
            fit_pending: false,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.definition.kind
    }

    pub fn definition(&self) -> &OverlayDefinition {
        &self.definition
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle == LifecycleState::Attached
    }

    /// Token the next fetch result must carry to be applied
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Shows or hides the overlay.
    ///
    /// Showing an overlay with no cached payload moves it to `Fetching` and
    /// returns the request to run. Hiding removes whatever is attached and
    /// invalidates any outstanding request.
    pub fn set_visible(&mut self, visible: bool) -> Result<Option<FetchRequest>> {
        if visible {
            self.show()
        } else {
            self.hide();
            Ok(None)
        }
    }

    fn show(&mut self) -> Result<Option<FetchRequest>> {
        self.state.visible = true;
        match self.lifecycle {
            LifecycleState::Fetching | LifecycleState::Attached | LifecycleState::Reattaching => {
                return Ok(None)
            }
            LifecycleState::Detached => {}
        }

        match self.definition.data_source.clone() {
            DataSource::RegionTiled => {
                if let Some(region) = self.state.active_region {
                    self.fit_pending = true;
                    self.attach_region(region)?;
                }
                Ok(None)
            }
            DataSource::StaticFile { url } => {
                if self.state.last_fetched_data.is_some() {
                    self.attach_cached()?;
                    return Ok(None);
                }
                self.token += 1;
                self.transition(LifecycleState::Fetching);
                Ok(Some(FetchRequest {
                    kind: self.definition.kind,
                    token: self.token,
                    url,
                }))
            }
        }
    }

    fn hide(&mut self) {
        self.state.visible = false;
        self.token += 1;
        if self.lifecycle != LifecycleState::Detached {
            self.detach();
        }
    }

    /// Delivers the outcome of a fetch issued under `token`.
    ///
    /// Results for a superseded token, or arriving after the overlay stopped
    /// fetching, are discarded. A failed fetch leaves the overlay detached.
    pub fn complete_fetch(
        &mut self,
        token: u64,
        result: Result<FeatureCollection>,
    ) -> Result<()> {
        if token != self.token
            || self.lifecycle != LifecycleState::Fetching
            || !self.state.visible
        {
            log::warn!(
                "{}: discarding stale fetch result (token {}, current {}, {})",
                self.definition.kind,
                token,
                self.token,
                self.lifecycle
            );
            return Ok(());
        }

        match result {
            Ok(data) => {
                self.state.last_fetched_data = Some(data);
                self.attach_cached()
            }
            Err(e) => {
                self.transition(LifecycleState::Detached);
                Err(Error::Fetch {
                    overlay: self.definition.kind.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Applies a filter selection.
    ///
    /// Parcel overlays swap their source data in place from the cached payload.
    /// The cadastral overlay follows `cadastral_map`: a new region replaces the
    /// old one, and no region hides the overlay. Other overlays only remember it.
    pub fn apply_filter(&mut self, selection: FilterSelection) -> Result<()> {
        self.state.active_filter = Some(selection);

        if self.definition.data_source == DataSource::RegionTiled {
            return self.set_region(selection.cadastral_map);
        }

        let Some(generation) = self.definition.category_filter else {
            return Ok(());
        };
        if self.lifecycle != LifecycleState::Attached {
            return Ok(());
        }
        let Some(raw) = &self.state.last_fetched_data else {
            return Ok(());
        };

        let filtered = resolve(&selection, raw, generation);
        log::debug!(
            "{}: filter {:?} keeps {} of {} features",
            self.definition.kind,
            selection.land_category,
            filtered.len(),
            raw.len()
        );
        self.renderer
            .borrow_mut()
            .set_source_data(self.definition.source_id, filtered)
    }

    /// Switches the cadastral overlay to `region`, or hides it for `None`
    pub fn set_region(&mut self, region: Option<RegionId>) -> Result<()> {
        if region == self.state.active_region && self.state.visible == region.is_some() {
            return Ok(());
        }

        if self.lifecycle != LifecycleState::Detached {
            self.detach();
        }
        self.state.active_region = region;
        self.state.visible = region.is_some();
        self.fit_pending = region.is_some();

        match region {
            Some(region) => self.attach_region(region),
            None => Ok(()),
        }
    }

    /// Re-runs the attach sequence after the renderer replaced its style.
    ///
    /// Cached payloads are reused, nothing is fetched. A controller still
    /// fetching attaches onto the new style when its result arrives.
    pub fn on_basemap_style_changed(&mut self) -> Result<()> {
        let should_attach = match self.lifecycle {
            LifecycleState::Attached | LifecycleState::Reattaching => true,
            // retry an attach that the renderer rejected earlier
            LifecycleState::Detached => self.state.visible && self.has_attach_input(),
            LifecycleState::Fetching => false,
        };
        if !should_attach {
            return Ok(());
        }

        self.transition(LifecycleState::Reattaching);
        if self.definition.data_source != DataSource::RegionTiled {
            return self.attach_cached();
        }
        match self.state.active_region {
            Some(region) => self.attach_region(region),
            None => {
                self.transition(LifecycleState::Detached);
                Ok(())
            }
        }
    }

    /// Removes everything this overlay owns from the renderer and forgets
    /// outstanding fetches
    pub fn teardown(&mut self) {
        self.token += 1;
        self.state.visible = false;
        self.fit_pending = false;
        self.detach();
    }

    fn has_attach_input(&self) -> bool {
        match self.definition.data_source {
            DataSource::RegionTiled => self.state.active_region.is_some(),
            DataSource::StaticFile { .. } => self.state.last_fetched_data.is_some(),
        }
    }

    fn attach_cached(&mut self) -> Result<()> {
        let Some(raw) = &self.state.last_fetched_data else {
            self.transition(LifecycleState::Detached);
            return Ok(());
        };

        if self.definition.warn_when_empty && raw.is_empty() {
            log::warn!("{}: dataset has no features", self.definition.kind);
        }

        if let Some(generation) = self.definition.category_filter {
            let unmapped = unmapped_labels(raw, generation);
            if !unmapped.is_empty() {
                log::warn!(
                    "{}: ownership labels without a category: {:?}",
                    self.definition.kind,
                    unmapped
                );
            }
        }

        let data = match (self.definition.category_filter, &self.state.active_filter) {
            (Some(generation), Some(selection)) => resolve(selection, raw, generation),
            _ => raw.clone(),
        };
        let feature_count = data.len();

        self.remove_owned_resources();
        let result = self.add_static_resources(data);
        self.finish_attach(result)?;
        log::info!(
            "{}: attached {} features",
            self.definition.kind,
            feature_count
        );
        Ok(())
    }

    fn add_static_resources(&mut self, data: FeatureCollection) -> Result<()> {
        {
            let mut renderer = self.renderer.borrow_mut();
            renderer.add_source(self.definition.source_id, SourceSpec::geojson(data))?;
            for layer in self.definition.style_layers() {
                renderer.add_layer(layer)?;
            }
        }
        self.register_handlers();
        Ok(())
    }

    /// Attaches `region`, fitting the viewport if that is still owed
    fn attach_region(&mut self, region: RegionId) -> Result<()> {
        let overlay = self.regions.provide(region);

        self.remove_owned_resources();
        let result = {
            let mut renderer = self.renderer.borrow_mut();
            let added = renderer
                .add_source(overlay.source_id, overlay.source)
                .and_then(|_| renderer.add_layer(overlay.layer));
            added
        };
        self.finish_attach(result)?;

        if std::mem::take(&mut self.fit_pending) {
            self.renderer
                .borrow_mut()
                .fit_bounds(overlay.fit.bounds, overlay.fit.options);
        }
        log::info!("{}: attached region {}", self.definition.kind, region);
        Ok(())
    }

    fn finish_attach(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.state.attached = true;
                self.transition(LifecycleState::Attached);
                Ok(())
            }
            Err(e) => {
                // roll back a partial attach so `attached` stays truthful
                self.remove_owned_resources();
                self.transition(LifecycleState::Detached);
                Err(e)
            }
        }
    }

    fn register_handlers(&mut self) {
        let Some(layer_id) = self.definition.interactive_layer else {
            return;
        };
        let mut renderer = self.renderer.borrow_mut();
        for kind in [PointerEventKind::MouseEnter, PointerEventKind::MouseLeave] {
            self.handlers
                .push(renderer.on(kind, layer_id, hover_cursor_handler(kind)));
        }
        if let Some(popup) = &self.definition.popup {
            self.handlers.push(renderer.on(
                PointerEventKind::Click,
                layer_id,
                popup.clone().click_handler(),
            ));
        }
    }

    fn detach(&mut self) {
        self.remove_owned_resources();
        self.transition(LifecycleState::Detached);
        log::info!("{}: detached", self.definition.kind);
    }

    /// Best-effort removal of handlers, layers and source
    fn remove_owned_resources(&mut self) {
        let mut renderer = self.renderer.borrow_mut();
        for id in self.handlers.drain(..) {
            renderer.off(id);
        }
        for layer_id in self.definition.layer_ids().into_iter().rev() {
            if let Err(e) = renderer.remove_layer(layer_id) {
                log::error!("{}: {}", self.definition.kind, e);
            }
        }
        if let Err(e) = renderer.remove_source(self.definition.source_id) {
            log::error!("{}: {}", self.definition.kind, e);
        }
        self.state.attached = false;
    }

    fn transition(&mut self, next: LifecycleState) {
        if self.lifecycle != next {
            log::debug!(
                "{}: {} -> {}",
                self.definition.kind,
                self.lifecycle,
                next
            );
            self.lifecycle = next;
        }
        if next != LifecycleState::Attached {
            self.state.attached = false;
        }
    }
}
