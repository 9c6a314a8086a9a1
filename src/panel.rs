//! The single tooltip panel and its show/hide lifecycle.

use crate::position::{fit, Point, Size};
use crate::render::RenderPipeline;
use crate::target::{resolve, Dataset};
use futures::future::{self, FutureExt, LocalBoxFuture};
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Visual surface the panel is drawn on.
pub trait Canvas {
    fn set_visible(&self, visible: bool);
    fn set_position(&self, top_left: Point);
    fn set_markup(&self, markup: &str);
    /// Current rendered size of the panel.
    fn dimensions(&self) -> Size;
}

pub trait Viewport {
    fn size(&self) -> Size;
}

/// Callback receiving pointer positions in page coordinates.
pub type PointerHandler = Rc<dyn Fn(Point)>;

/// The document-wide pointer-move slot. Exactly one handler (or none) is installed at a time.
pub trait PointerTracking {
    fn current(&self) -> Option<PointerHandler>;
    fn install(&self, handler: Option<PointerHandler>);
}

pub struct PanelController {
    canvas: Rc<dyn Canvas>,
    viewport: Rc<dyn Viewport>,
    pointer: Rc<dyn PointerTracking>,
    pipeline: Rc<RenderPipeline>,
    offset: Point,
    position: Cell<Point>,
    own_handler: PointerHandler,
    saved_handler: RefCell<Option<PointerHandler>>,
    tracking: Cell<bool>,
    generation: Cell<u64>,
}

impl PanelController {
    pub fn new(
        canvas: Rc<dyn Canvas>,
        viewport: Rc<dyn Viewport>,
        pointer: Rc<dyn PointerTracking>,
        pipeline: Rc<RenderPipeline>,
        offset: Point,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let own_handler: PointerHandler = Rc::new(move |at: Point| {
                if let Some(panel) = weak.upgrade() {
                    panel.pointer_moved(at);
                }
            });
            Self {
                canvas,
                viewport,
                pointer,
                pipeline,
                offset,
                position: Cell::new(Point::default()),
                own_handler,
                saved_handler: RefCell::new(None),
                tracking: Cell::new(false),
                generation: Cell::new(0),
            }
        })
    }

    pub fn pipeline(&self) -> &Rc<RenderPipeline> {
        &self.pipeline
    }

    /// Last pointer position seen by the panel.
    pub fn pointer_position(&self) -> Point {
        self.position.get()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.get()
    }

    /// Show the panel for the element behind `dataset`.
    ///
    /// Everything visible happens before this returns: pointer tracking is
    /// taken over and the loading fragment is displayed. The returned future
    /// performs the render and applies it, unless the panel was hidden or
    /// re-shown in the meantime. Elements naming no data kind are ignored.
    pub fn show(self: &Rc<Self>, dataset: &dyn Dataset) -> LocalBoxFuture<'static, ()> {
        let target = match resolve(dataset) {
            Some(target) => target,
            None => {
                debug!("Ignoring invalid data type");
                return future::ready(()).boxed_local();
            }
        };

        let token = self.next_generation();
        if !self.tracking.replace(true) {
            *self.saved_handler.borrow_mut() = self.pointer.current();
            self.pointer.install(Some(self.own_handler.clone()));
        }

        self.canvas.set_markup(&self.pipeline.loading_markup());
        self.canvas.set_position(self.position.get() + self.offset);
        self.canvas.set_visible(true);

        let panel = Rc::clone(self);
        async move {
            let markup = match panel.pipeline.render(&target).await {
                Ok(markup) => markup,
                Err(failure) => {
                    debug!("Render of {:?} failed: {}", target, failure.cause);
                    failure.markup
                }
            };
            if panel.generation.get() != token {
                debug!("Discarding stale render of {:?}", target);
                return;
            }
            panel.canvas.set_markup(&markup);
            panel.adjust();
        }
        .boxed_local()
    }

    /// Hide the panel, hand pointer tracking back and drop any render in flight.
    pub fn hide(&self) {
        self.next_generation();
        self.canvas.set_visible(false);
        if self.tracking.replace(false) {
            self.pointer.install(self.saved_handler.borrow_mut().take());
        }
        self.canvas.set_markup("");
    }

    /// Follow the pointer and keep the panel inside the viewport.
    pub fn pointer_moved(&self, at: Point) {
        self.position.set(at);
        self.adjust();
    }

    /// Re-fit the panel to its current dimensions around the last pointer position.
    pub fn adjust(&self) {
        let top_left = fit(
            self.position.get(),
            self.canvas.dimensions(),
            self.viewport.size(),
            self.offset,
        );
        self.canvas.set_position(top_left);
    }

    fn next_generation(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }
}
