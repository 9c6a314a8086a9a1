//! In-memory stand-ins for the tooltip service and the browser page.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use league_tooltips::bootstrap::{HostDocument, TooltipEngine};
use league_tooltips::config::TooltipOptions;
use league_tooltips::error::{BootstrapError, FetchError};
use league_tooltips::gateway::{HttpClient, HttpResponse};
use league_tooltips::panel::{Canvas, PanelController, PointerHandler, PointerTracking, Viewport};
use league_tooltips::position::{Point, Size};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub const BASE: &str = "/tooltips/";

pub const ITEM_TEMPLATE: &str =
    r#"<h1><%= name %></h1><p><%= locale.Cost %>: <%= gold.total %></p><small><%= patchVersion.version %></small>"#;
pub const BOOTS_MARKUP: &str = "<h1>Boots of Speed</h1><p>Cost: 300</p><small>7.10.1</small>";
pub const LOADING_MARKUP: &str = r#"<img src="/tooltips/assets/img/load.gif">"#;

// ──────────────────────────────────────────────────────────────────────────────
// Service

#[derive(Default)]
pub struct MockClient {
    routes: RefCell<HashMap<String, Result<HttpResponse, FetchError>>>,
    requests: RefCell<Vec<String>>,
    held: RefCell<HashMap<String, Shared<LocalBoxFuture<'static, ()>>>>,
    gates: RefCell<HashMap<String, oneshot::Sender<()>>>,
}

impl MockClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Service answering every bootstrap request plus `item/1001` in `en_US`.
    pub fn standard() -> Rc<Self> {
        let client = Self::new();
        client.route("/tooltips/patch", r#"{ "patch": { "version": "7.10.1" } }"#);
        client.route("/tooltips/locale/en_US", r#"{ "locale": { "Cost": "Cost" } }"#);
        client.route("/tooltips/html/loading.html", r#"<img src="<%= gifLink %>">"#);
        client.route("/tooltips/html/error.html", "<%= error %>");
        client.route("/tooltips/html/item.html", ITEM_TEMPLATE);
        client.route(
            "/tooltips/item/1001?locale=en_US",
            r#"{ "name": "Boots of Speed", "gold": { "total": 300 } }"#,
        );
        client
    }

    pub fn route(&self, url: &str, body: &str) {
        self.respond(url, Ok(HttpResponse::ok(body)));
    }

    pub fn respond(&self, url: &str, response: Result<HttpResponse, FetchError>) {
        self.routes.borrow_mut().insert(url.to_string(), response);
    }

    pub fn fail(&self, url: &str) {
        self.respond(url, Err(FetchError::transport("connection refused")));
    }

    /// Keep requests to `url` pending until [`MockClient::release`].
    pub fn hold(&self, url: &str) {
        let (sender, receiver) = oneshot::channel();
        let gate = receiver.map(|_| ()).boxed_local().shared();
        self.held.borrow_mut().insert(url.to_string(), gate);
        self.gates.borrow_mut().insert(url.to_string(), sender);
    }

    pub fn release(&self, url: &str) {
        self.held.borrow_mut().remove(url);
        if let Some(sender) = self.gates.borrow_mut().remove(url) {
            let _ = sender.send(());
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| *r == url).count()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }
}

impl HttpClient for MockClient {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>> {
        self.requests.borrow_mut().push(url.to_string());
        let response = self.routes.borrow().get(url).cloned().unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 404,
                body: "Not Found".into(),
            })
        });
        let gate = self.held.borrow().get(url).cloned();
        async move {
            if let Some(gate) = gate {
                gate.await;
            }
            response
        }
        .boxed_local()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Page

pub struct MockCanvas {
    pub markup: RefCell<String>,
    pub visible: Cell<bool>,
    pub position: Cell<Point>,
    pub size: Cell<Size>,
    pub markup_writes: Cell<usize>,
}

impl Default for MockCanvas {
    fn default() -> Self {
        Self {
            markup: RefCell::new(String::new()),
            visible: Cell::new(true),
            position: Cell::new(Point::default()),
            size: Cell::new(Size::new(50.0, 40.0)),
            markup_writes: Cell::new(0),
        }
    }
}

impl MockCanvas {
    pub fn markup(&self) -> String {
        self.markup.borrow().clone()
    }
}

impl Canvas for MockCanvas {
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn set_position(&self, top_left: Point) {
        self.position.set(top_left);
    }

    fn set_markup(&self, markup: &str) {
        *self.markup.borrow_mut() = markup.to_string();
        self.markup_writes.set(self.markup_writes.get() + 1);
    }

    fn dimensions(&self) -> Size {
        self.size.get()
    }
}

pub struct FixedViewport(pub Size);

impl Viewport for FixedViewport {
    fn size(&self) -> Size {
        self.0
    }
}

#[derive(Default)]
pub struct MockPointer {
    slot: RefCell<Option<PointerHandler>>,
    pub installs: Cell<usize>,
}

impl MockPointer {
    pub fn installed(&self) -> Option<PointerHandler> {
        self.slot.borrow().clone()
    }
}

impl PointerTracking for MockPointer {
    fn current(&self) -> Option<PointerHandler> {
        self.installed()
    }

    fn install(&self, handler: Option<PointerHandler>) {
        *self.slot.borrow_mut() = handler;
        self.installs.set(self.installs.get() + 1);
    }
}

pub struct MockHost {
    pub canvas: Rc<MockCanvas>,
    pub pointer: Rc<MockPointer>,
    pub viewport: Size,
    pub panel_ids: RefCell<Vec<String>>,
    pub stylesheets: RefCell<Vec<(String, String)>>,
    pub bound: RefCell<Option<Rc<PanelController>>>,
    pub triggers: usize,
    pub refuse_panel: Cell<bool>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            canvas: Rc::new(MockCanvas::default()),
            pointer: Rc::new(MockPointer::default()),
            viewport: Size::new(1000.0, 800.0),
            panel_ids: RefCell::new(Vec::new()),
            stylesheets: RefCell::new(Vec::new()),
            bound: RefCell::new(None),
            triggers: 3,
            refuse_panel: Cell::new(false),
        }
    }
}

impl HostDocument for MockHost {
    fn create_panel(&self, id: &str) -> Result<Rc<dyn Canvas>, BootstrapError> {
        if self.refuse_panel.get() {
            return Err(BootstrapError::Host("no body".into()));
        }
        self.panel_ids.borrow_mut().push(id.to_string());
        Ok(self.canvas.clone())
    }

    fn inject_stylesheet(&self, href: &str, media: &str) -> Result<(), BootstrapError> {
        self.stylesheets
            .borrow_mut()
            .push((href.to_string(), media.to_string()));
        Ok(())
    }

    fn bind_triggers(&self, _class: &str, panel: Rc<PanelController>) -> Result<usize, BootstrapError> {
        *self.bound.borrow_mut() = Some(panel);
        Ok(self.triggers)
    }

    fn viewport(&self) -> Rc<dyn Viewport> {
        Rc::new(FixedViewport(self.viewport))
    }

    fn pointer_tracking(&self) -> Rc<dyn PointerTracking> {
        self.pointer.clone()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Helpers

pub fn engine(client: &Rc<MockClient>) -> TooltipEngine {
    let options = TooltipOptions {
        base_route: BASE.to_string(),
        ..TooltipOptions::default()
    };
    TooltipEngine::new(options, client.clone())
}

/// Engine bootstrapped against a fresh [`MockHost`], with the request log cleared.
pub fn ready(client: &Rc<MockClient>) -> (TooltipEngine, MockHost, Rc<PanelController>) {
    let engine = engine(client);
    let host = MockHost::default();
    let panel = futures::executor::block_on(engine.init(&host)).expect("bootstrap");
    client.clear_requests();
    (engine, host, panel)
}

pub fn dataset(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
