//! Browser entry point: one tooltip engine per page, started once the page has loaded.

use league_tooltips::LeagueTooltips;
use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

fn main() {
    league_tooltips::init_logging();

    let tooltips = match LeagueTooltips::new(JsValue::UNDEFINED) {
        Ok(tooltips) => tooltips,
        Err(e) => {
            error!("Could not create league-tooltips: {:?}", e);
            return;
        }
    };

    let start = move || {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(tooltips.init()).await {
                error!("league-tooltips failed to start: {:?}", e);
            }
        });
    };

    if gloo_utils::document().ready_state() == "complete" {
        start();
    } else {
        let on_load = Closure::once_into_js(start);
        if let Err(e) = gloo_utils::window()
            .add_event_listener_with_callback("load", on_load.unchecked_ref())
        {
            error!("Could not wait for page load: {:?}", e);
        }
    }
}
