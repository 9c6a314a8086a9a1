//! Browser host: the panel `div`, the viewport, `document.onmousemove` and trigger wiring.

use crate::bootstrap::HostDocument;
use crate::error::BootstrapError;
use crate::panel::{Canvas, PanelController, PointerHandler, PointerTracking, Viewport};
use crate::position::{Point, Size};
use crate::target::Dataset;
use js_sys::Function;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlLinkElement, MouseEvent, Window};

fn js_error(context: &str, value: JsValue) -> BootstrapError {
    BootstrapError::Host(format!("{}: {}", context, value.as_string().unwrap_or_else(|| format!("{:?}", value))))
}

/// `data-*` attributes of a trigger element.
pub struct ElementDataset(pub Element);

impl Dataset for ElementDataset {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_attribute(&format!("data-{}", key))
    }
}

pub struct DomCanvas {
    element: HtmlElement,
}

impl DomCanvas {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Err(e) = self.element.style().set_property(property, value) {
            warn!("Could not set {} on tooltip: {:?}", property, e);
        }
    }
}

impl Canvas for DomCanvas {
    fn set_visible(&self, visible: bool) {
        self.set_style("visibility", if visible { "visible" } else { "hidden" });
    }

    fn set_position(&self, top_left: Point) {
        self.set_style("left", &format!("{}px", top_left.x));
        self.set_style("top", &format!("{}px", top_left.y));
    }

    fn set_markup(&self, markup: &str) {
        self.element.set_inner_html(markup);
    }

    fn dimensions(&self) -> Size {
        Size::new(self.element.client_width() as f64, self.element.client_height() as f64)
    }
}

pub struct DomViewport {
    window: Window,
}

impl Viewport for DomViewport {
    fn size(&self) -> Size {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(width, height)
    }
}

/// Engine handler installed on `document.onmousemove`, with the JS closure backing it.
struct Installed {
    handler: PointerHandler,
    closure: Closure<dyn FnMut(MouseEvent)>,
}

/// `document.onmousemove` seen through [`PointerTracking`].
///
/// Handlers set by the page are wrapped when read so they can be put back
/// exactly as they were.
pub struct DomPointerTracking {
    document: Document,
    installed: RefCell<Option<Installed>>,
    foreign: RefCell<Option<(PointerHandler, Function)>>,
}

impl DomPointerTracking {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            installed: RefCell::new(None),
            foreign: RefCell::new(None),
        }
    }
}

impl PointerTracking for DomPointerTracking {
    fn current(&self) -> Option<PointerHandler> {
        let function = self.document.onmousemove()?;

        if let Some(installed) = self.installed.borrow().as_ref() {
            if JsValue::from(function.clone()) == *installed.closure.as_ref() {
                return Some(installed.handler.clone());
            }
        }

        let page_function = function.clone();
        let wrapper: PointerHandler = Rc::new(move |_: Point| {
            if let Err(e) = page_function.call0(&JsValue::NULL) {
                warn!("Page mousemove handler failed: {:?}", e);
            }
        });
        *self.foreign.borrow_mut() = Some((wrapper.clone(), function));
        Some(wrapper)
    }

    fn install(&self, handler: Option<PointerHandler>) {
        let Some(handler) = handler else {
            self.document.set_onmousemove(None);
            return;
        };

        if let Some((wrapper, function)) = self.foreign.borrow().as_ref() {
            if Rc::ptr_eq(wrapper, &handler) {
                self.document.set_onmousemove(Some(function));
                return;
            }
        }

        let mut installed = self.installed.borrow_mut();
        let reusable = installed
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(&current.handler, &handler));
        if !reusable {
            let callback = handler.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                (*callback)(Point::new(event.page_x() as f64, event.page_y() as f64));
            }) as Box<dyn FnMut(MouseEvent)>);
            *installed = Some(Installed { handler, closure });
        }
        if let Some(current) = installed.as_ref() {
            self.document
                .set_onmousemove(Some(current.closure.as_ref().unchecked_ref()));
        }
    }
}

pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self, BootstrapError> {
        let window = web_sys::window().ok_or_else(|| BootstrapError::Host("No window object available".into()))?;
        let document = window
            .document()
            .ok_or_else(|| BootstrapError::Host("No document available".into()))?;
        Ok(Self { window, document })
    }
}

impl HostDocument for DomHost {
    fn create_panel(&self, id: &str) -> Result<Rc<dyn Canvas>, BootstrapError> {
        let element = self
            .document
            .create_element("div")
            .map_err(|e| js_error("Failed to create tooltip element", e))?;
        element.set_id(id);
        let element: HtmlElement = element
            .dyn_into()
            .map_err(|_| BootstrapError::Host("Tooltip element is not an HtmlElement".into()))?;

        let canvas = DomCanvas::new(element.clone());
        canvas.set_visible(false);

        let body = self
            .document
            .body()
            .ok_or_else(|| BootstrapError::Host("Document has no body".into()))?;
        body.insert_before(&element, body.first_child().as_ref())
            .map_err(|e| js_error("Failed to insert tooltip element", e))?;
        Ok(Rc::new(canvas))
    }

    fn inject_stylesheet(&self, href: &str, media: &str) -> Result<(), BootstrapError> {
        let link: HtmlLinkElement = self
            .document
            .create_element("link")
            .map_err(|e| js_error("Failed to create stylesheet link", e))?
            .dyn_into()
            .map_err(|_| BootstrapError::Host("Link element is not an HtmlLinkElement".into()))?;
        link.set_href(href);
        link.set_type("text/css");
        link.set_rel("stylesheet");
        link.set_media(media);

        self.document
            .head()
            .ok_or_else(|| BootstrapError::Host("Document has no head".into()))?
            .append_child(&link)
            .map_err(|e| js_error("Failed to append stylesheet", e))?;
        Ok(())
    }

    fn bind_triggers(&self, class: &str, panel: Rc<PanelController>) -> Result<usize, BootstrapError> {
        let triggers = self.document.get_elements_by_class_name(class);
        let mut bound = 0;

        for index in 0..triggers.length() {
            let Some(element) = triggers.item(index) else {
                continue;
            };

            let on_show = {
                let panel = panel.clone();
                let element = element.clone();
                Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                    wasm_bindgen_futures::spawn_local(panel.show(&ElementDataset(element.clone())));
                })
            };
            let on_hide = {
                let panel = panel.clone();
                Closure::<dyn FnMut(Event)>::new(move |_: Event| panel.hide())
            };

            element
                .add_event_listener_with_callback("mouseover", on_show.as_ref().unchecked_ref())
                .map_err(|e| js_error("Failed to bind mouseover", e))?;
            element
                .add_event_listener_with_callback("mouseout", on_hide.as_ref().unchecked_ref())
                .map_err(|e| js_error("Failed to bind mouseout", e))?;

            // Listeners live as long as the page
            on_show.forget();
            on_hide.forget();
            bound += 1;
        }
        Ok(bound)
    }

    fn viewport(&self) -> Rc<dyn Viewport> {
        Rc::new(DomViewport {
            window: self.window.clone(),
        })
    }

    fn pointer_tracking(&self) -> Rc<dyn PointerTracking> {
        Rc::new(DomPointerTracking::new(self.document.clone()))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn panel_is_inserted_hidden_as_first_body_child() {
        let host = DomHost::new().unwrap();
        let canvas = host.create_panel("league-tooltip-test").unwrap();
        canvas.set_markup("<p>hi</p>");

        let body = gloo_utils::body();
        let first = body.first_element_child().unwrap();
        assert_eq!(first.id(), "league-tooltip-test");
        assert_eq!(first.inner_html(), "<p>hi</p>");

        let element: HtmlElement = first.dyn_into().unwrap();
        assert_eq!(element.style().get_property_value("visibility").unwrap(), "hidden");
        element.remove();
    }

    #[wasm_bindgen_test]
    fn page_mousemove_handler_is_restored() {
        let host = DomHost::new().unwrap();
        let tracking = host.pointer_tracking();
        let page = Function::new_no_args("");
        gloo_utils::document().set_onmousemove(Some(&page));

        let saved = tracking.current();
        let engine: PointerHandler = Rc::new(|_: Point| {});
        tracking.install(Some(engine.clone()));
        assert!(Rc::ptr_eq(&tracking.current().unwrap(), &engine));

        tracking.install(saved);
        assert_eq!(JsValue::from(gloo_utils::document().onmousemove().unwrap()), JsValue::from(page));
        gloo_utils::document().set_onmousemove(None);
    }
}
