//! Browser transport built on `window.fetch`.

use crate::error::FetchError;
use crate::gateway::{HttpClient, HttpResponse};
use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClient;

impl BrowserClient {
    pub fn new() -> Self {
        Self
    }
}

impl HttpClient for BrowserClient {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>> {
        let url = url.to_string();
        async move {
            let window =
                web_sys::window().ok_or_else(|| FetchError::transport("No window object available"))?;

            let resp_value = JsFuture::from(window.fetch_with_str(&url))
                .await
                .map_err(|e| FetchError::Transport(format!("Fetch of {} failed: {}", url, describe(&e))))?;
            let resp: Response = resp_value
                .dyn_into()
                .map_err(|_| FetchError::transport("Invalid response type"))?;

            let text_promise = resp
                .text()
                .map_err(|e| FetchError::Transport(format!("Failed to read body: {}", describe(&e))))?;
            let body = JsFuture::from(text_promise)
                .await
                .map_err(|e| FetchError::Transport(format!("Failed to read body: {}", describe(&e))))?;

            Ok(HttpResponse {
                status: resp.status(),
                body: body.as_string().unwrap_or_default(),
            })
        }
        .boxed_local()
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
