//! Engine-level configuration constants and runtime options.

use serde::Deserialize;

// Service layout
pub const DEFAULT_BASE_ROUTE: &str = "/tooltips/";
/// Base route baked in at build time, e.g. `LEAGUE_TOOLTIPS_BASE_ROUTE=/api/tips/`.
pub const BUILD_BASE_ROUTE: Option<&str> = option_env!("LEAGUE_TOOLTIPS_BASE_ROUTE");
pub const LOADING_GIF_PATH: &str = "assets/img/load.gif";
pub const STYLESHEET_PATH: &str = "styles/tooltip.css";
pub const STYLESHEET_MEDIA: &str = "screen,print";

// Panel behavior
pub const DEFAULT_LOCALE: &str = "en_US";
pub const PANEL_ID: &str = "league-tooltip";
pub const TRIGGER_CLASS: &str = "league-tooltip";
pub const OFFSET_X: f64 = 10.0;
pub const OFFSET_Y: f64 = 10.0;

// Built-in fragments, used when the service cannot provide its own
pub const DEFAULT_LOADING_FRAGMENT: &str = r#"<div class="league-tooltip__info">
  <img src="<%= gifLink %>" alt="Loading ..." />
</div>"#;
pub const DEFAULT_ERROR_FRAGMENT: &str = r#"<div class="league-tooltip__info">
  <h1 class="league-tooltip__title"><%= error %></h1>
</div>"#;

// Messages shown in the error fragment
pub const NO_PATCH_MESSAGE: &str = "Error : no patch version available.";
pub const DISPLAY_ERROR_MESSAGE: &str = "Display error";

/// Base route the engine talks to when no runtime override is given.
pub fn base_route() -> String {
    match BUILD_BASE_ROUTE {
        Some(route) if !route.trim().is_empty() => normalize_base_route(route),
        _ => DEFAULT_BASE_ROUTE.to_string(),
    }
}

/// Ensure the route ends with exactly one `/` so paths can be appended directly.
pub fn normalize_base_route(route: &str) -> String {
    let trimmed = route.trim().trim_end_matches('/');
    format!("{}/", trimmed)
}

/// Options accepted from the host page. Every field is optional on the JS side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipOptions {
    pub base_route: String,
    pub locale: String,
    pub trigger_class: String,
    pub panel_id: String,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            base_route: base_route(),
            locale: DEFAULT_LOCALE.to_string(),
            trigger_class: TRIGGER_CLASS.to_string(),
            panel_id: PANEL_ID.to_string(),
            offset_x: OFFSET_X,
            offset_y: OFFSET_Y,
        }
    }
}

impl TooltipOptions {
    /// Fill blanks with defaults and normalize the base route.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.base_route.trim().is_empty() {
            self.base_route = defaults.base_route;
        } else {
            self.base_route = normalize_base_route(&self.base_route);
        }
        if self.locale.trim().is_empty() {
            self.locale = defaults.locale;
        }
        if self.trigger_class.trim().is_empty() {
            self.trigger_class = defaults.trigger_class;
        }
        if self.panel_id.trim().is_empty() {
            self.panel_id = defaults.panel_id;
        }
        self
    }
}
