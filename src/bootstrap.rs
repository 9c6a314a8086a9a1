//! One-time startup: prefetch what every tooltip needs, then wire the page.

use crate::cache::DataCache;
use crate::config::{TooltipOptions, STYLESHEET_MEDIA};
use crate::error::BootstrapError;
use crate::gateway::{FetchGateway, HttpClient};
use crate::panel::{Canvas, PanelController, PointerTracking, Viewport};
use crate::position::Point;
use crate::render::RenderPipeline;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Page-side operations the bootstrap needs from its host.
pub trait HostDocument {
    /// Create the hidden panel element with `id` and return its canvas.
    fn create_panel(&self, id: &str) -> Result<Rc<dyn Canvas>, BootstrapError>;

    fn inject_stylesheet(&self, href: &str, media: &str) -> Result<(), BootstrapError>;

    /// Attach show/hide to every element carrying `class`. Returns how many were bound.
    fn bind_triggers(&self, class: &str, panel: Rc<PanelController>) -> Result<usize, BootstrapError>;

    fn viewport(&self) -> Rc<dyn Viewport>;

    fn pointer_tracking(&self) -> Rc<dyn PointerTracking>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    NotStarted,
    InProgress,
    Ready,
}

/// Owns the engine state for one page: options, render pipeline and, once
/// bootstrapped, the panel.
pub struct TooltipEngine {
    options: TooltipOptions,
    pipeline: Rc<RenderPipeline>,
    state: Cell<BootstrapState>,
    panel: RefCell<Option<Rc<PanelController>>>,
}

impl TooltipEngine {
    pub fn new(options: TooltipOptions, client: Rc<dyn HttpClient>) -> Self {
        let gateway = FetchGateway::new(client, &options.base_route);
        let pipeline = RenderPipeline::new(gateway, DataCache::shared(), &options.locale);
        Self {
            options,
            pipeline: Rc::new(pipeline),
            state: Cell::new(BootstrapState::NotStarted),
            panel: RefCell::new(None),
        }
    }

    pub fn options(&self) -> &TooltipOptions {
        &self.options
    }

    pub fn pipeline(&self) -> &Rc<RenderPipeline> {
        &self.pipeline
    }

    pub fn state(&self) -> BootstrapState {
        self.state.get()
    }

    pub fn panel(&self) -> Option<Rc<PanelController>> {
        self.panel.borrow().clone()
    }

    pub fn locale(&self) -> String {
        self.pipeline.locale()
    }

    pub fn set_locale(&self, locale: &str) {
        self.pipeline.set_locale(locale);
    }

    /// Run the bootstrap sequence. Only the first call does anything.
    ///
    /// The patch version, the active locale and both fragments are requested
    /// concurrently; failures are logged and do not stop startup, since the
    /// fragments have built-in defaults and patch/locale are retried on render.
    /// Triggers are bound only once all four have settled.
    pub async fn init(&self, host: &dyn HostDocument) -> Result<Rc<PanelController>, BootstrapError> {
        match self.state.get() {
            BootstrapState::NotStarted => self.state.set(BootstrapState::InProgress),
            BootstrapState::InProgress => return Err(BootstrapError::InProgress),
            BootstrapState::Ready => return Err(BootstrapError::AlreadyReady),
        }
        info!("Initializing league-tooltips on {}", self.options.base_route);

        let locale = self.pipeline.locale();
        let gateway = self.pipeline.gateway();
        let (_, _, loading, error) = futures::join!(
            self.pipeline.refresh_patch(),
            self.pipeline.refresh_locale(&locale),
            gateway.fetch_loading_fragment(),
            gateway.fetch_error_fragment(),
        );

        {
            let mut cache = self.pipeline.cache().borrow_mut();
            match loading {
                Ok(fragment) => cache.set_loading_fragment(fragment),
                Err(err) => warn!("Using built-in loading fragment: {}", err),
            }
            match error {
                Ok(fragment) => cache.set_error_fragment(fragment),
                Err(err) => warn!("Using built-in error fragment: {}", err),
            }
        }

        match self.wire(host) {
            Ok(panel) => {
                *self.panel.borrow_mut() = Some(panel.clone());
                self.state.set(BootstrapState::Ready);
                info!("Initialized league-tooltips");
                Ok(panel)
            }
            Err(err) => {
                self.state.set(BootstrapState::NotStarted);
                Err(err)
            }
        }
    }

    fn wire(&self, host: &dyn HostDocument) -> Result<Rc<PanelController>, BootstrapError> {
        debug!("Creating tooltip element");
        let canvas = host.create_panel(&self.options.panel_id)?;
        canvas.set_visible(false);

        debug!("Appending league-tooltips stylesheet");
        host.inject_stylesheet(&self.pipeline.gateway().stylesheet_url(), STYLESHEET_MEDIA)?;

        let panel = PanelController::new(
            canvas,
            host.viewport(),
            host.pointer_tracking(),
            self.pipeline.clone(),
            Point::new(self.options.offset_x, self.options.offset_y),
        );

        let bound = host.bind_triggers(&self.options.trigger_class, panel.clone())?;
        debug!("Added listeners to {} .{} elements", bound, self.options.trigger_class);
        Ok(panel)
    }
}
