//! Hover tooltips for League of Legends reference data.
//!
//! Elements carrying the trigger class and a `data-<kind>="<id>"` attribute get
//! a panel that follows the pointer and shows markup rendered from the tooltip
//! service's templates and data. The engine is generic over its host (see
//! [`bootstrap::HostDocument`]) and its transport ([`gateway::HttpClient`]);
//! [`LeagueTooltips`] wires it to the browser.

use log::info;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod inflight;
pub mod panel;
pub mod position;
pub mod render;
pub mod target;
pub mod template;

use bootstrap::TooltipEngine;
use config::TooltipOptions;

/// Install the panic hook and route `log` to the browser console. Safe to call twice.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).ok();
    }
}

/// JavaScript handle for one page's tooltips.
///
/// ```js
/// const tips = new LeagueTooltips({ baseRoute: "/tooltips/", locale: "fr_FR" });
/// await tips.init();
/// tips.locale = "en_US";
/// ```
#[wasm_bindgen]
pub struct LeagueTooltips {
    engine: Rc<TooltipEngine>,
}

#[wasm_bindgen]
impl LeagueTooltips {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<LeagueTooltips, JsValue> {
        init_logging();

        let options: TooltipOptions = if options.is_undefined() || options.is_null() {
            TooltipOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid tooltip options: {}", e)))?
        };
        let options = options.normalized();
        info!("Base route {}", options.base_route);

        Ok(Self {
            engine: Rc::new(TooltipEngine::new(options, Rc::new(fetch::BrowserClient::new()))),
        })
    }

    /// Bootstrap against the current document. Rejects if called more than once.
    pub fn init(&self) -> js_sys::Promise {
        let engine = self.engine.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let host = dom::DomHost::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
            engine
                .init(&host)
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    #[wasm_bindgen(getter)]
    pub fn locale(&self) -> String {
        self.engine.locale()
    }

    #[wasm_bindgen(setter)]
    pub fn set_locale(&self, locale: String) {
        self.engine.set_locale(&locale);
    }

    #[wasm_bindgen(getter, js_name = baseRoute)]
    pub fn base_route(&self) -> String {
        self.engine.options().base_route.clone()
    }

    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}
