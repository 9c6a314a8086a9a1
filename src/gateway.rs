//! Requests against the tooltip service and classification of their outcomes.
//!
//! Every JSON body may carry an `err` string whatever the HTTP status; that is
//! reported as [`FetchError::Semantic`] and takes precedence over the status, so
//! a `404` with `{ "err": "Item not found" }` surfaces the service's message.

use crate::cache::{ItemKey, PatchInfo};
use crate::config::{LOADING_GIF_PATH, STYLESHEET_PATH};
use crate::error::FetchError;
use crate::target::DataKind;
use futures::future::{FutureExt, LocalBoxFuture};
use log::debug;
use serde_json::Value;
use std::rc::Rc;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by the gateway. The browser implementation lives in [`crate::fetch`].
pub trait HttpClient {
    /// Issue a GET for `url`. Only network-level failures are errors here.
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>>;
}

#[derive(Clone)]
pub struct FetchGateway {
    client: Rc<dyn HttpClient>,
    base_route: Rc<str>,
}

impl FetchGateway {
    pub fn new(client: Rc<dyn HttpClient>, base_route: &str) -> Self {
        Self {
            client,
            base_route: Rc::from(base_route),
        }
    }

    pub fn base_route(&self) -> &str {
        &self.base_route
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_route, path)
    }

    pub fn loading_gif_url(&self) -> String {
        self.url(LOADING_GIF_PATH)
    }

    pub fn stylesheet_url(&self) -> String {
        self.url(STYLESHEET_PATH)
    }

    /// `GET {base}patch` → `{ patch: { version, err? } }`
    pub fn fetch_patch_version(&self) -> LocalBoxFuture<'static, Result<PatchInfo, FetchError>> {
        let request = self.get_json("patch", Some("patch"));
        async move {
            debug!("Requesting patch version");
            let body = request.await?;
            let patch = envelope(&body, "patch")?;
            let version = match patch {
                Value::String(version) => version.clone(),
                Value::Object(map) => match map.get("version") {
                    Some(Value::String(version)) => version.clone(),
                    Some(Value::Number(version)) => version.to_string(),
                    _ => return Err(FetchError::transport("patch payload has no version")),
                },
                _ => return Err(FetchError::transport("patch payload has no version")),
            };
            debug!("Requested patch version {}", version);
            Ok(PatchInfo::Version(version))
        }
        .boxed_local()
    }

    /// `GET {base}locale/{locale}` → `{ locale: { ...translations, err? } }`
    pub fn fetch_locale(&self, locale: &str) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
        let request = self.get_json(&format!("locale/{}", locale), Some("locale"));
        async move {
            let body = request.await?;
            envelope(&body, "locale").cloned()
        }
        .boxed_local()
    }

    pub fn fetch_loading_fragment(&self) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self.get_text("html/loading.html")
    }

    pub fn fetch_error_fragment(&self) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self.get_text("html/error.html")
    }

    /// `GET {base}html/{kind}.html` → raw markup template
    pub fn fetch_item_template(&self, kind: DataKind) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self.get_text(&format!("html/{}.html", kind))
    }

    /// `GET {base}{kind}/{id}?locale={locale}` → `{ ...fields, err? }`
    pub fn fetch_item_data(&self, key: &ItemKey) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
        self.get_json(&format!("{}/{}?locale={}", key.kind, key.id, key.locale), None)
    }

    fn get_text(&self, path: &str) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        let url = self.url(path);
        let response = self.client.get(&url);
        async move {
            let response = response.await?;
            if !response.is_success() {
                return Err(FetchError::Transport(format!("HTTP {} for {}", response.status, url)));
            }
            Ok(response.body)
        }
        .boxed_local()
    }

    /// Fetch and parse a JSON body, rejecting an `err` at the top level or inside
    /// `field` before looking at the status.
    fn get_json(
        &self,
        path: &str,
        field: Option<&'static str>,
    ) -> LocalBoxFuture<'static, Result<Value, FetchError>> {
        let url = self.url(path);
        let response = self.client.get(&url);
        async move {
            let response = response.await?;
            let body: Value = match serde_json::from_str(&response.body) {
                Ok(body) => body,
                Err(_) if !response.is_success() => {
                    return Err(FetchError::Transport(format!("HTTP {} for {}", response.status, url)))
                }
                Err(e) => {
                    return Err(FetchError::Transport(format!("invalid JSON from {}: {}", url, e)))
                }
            };
            check_err(&body)?;
            if let Some(inner) = field.and_then(|field| body.get(field)) {
                check_err(inner)?;
            }
            if !response.is_success() {
                return Err(FetchError::Transport(format!("HTTP {} for {}", response.status, url)));
            }
            Ok(body)
        }
        .boxed_local()
    }
}

fn check_err(value: &Value) -> Result<(), FetchError> {
    match value.get("err") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(FetchError::Semantic(message.clone())),
        Some(other) => Err(FetchError::Semantic(other.to_string())),
    }
}

/// Unwrap `{ field: ... }`, treating an `err` inside the payload as semantic.
fn envelope<'a>(body: &'a Value, field: &str) -> Result<&'a Value, FetchError> {
    let inner = body
        .get(field)
        .ok_or_else(|| FetchError::Transport(format!("response has no `{}` field", field)))?;
    check_err(inner)?;
    Ok(inner)
}
