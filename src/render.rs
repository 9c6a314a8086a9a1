//! Render pipeline: from a resolved hover target to panel markup.
//!
//! Each render walks the same steps: make sure a usable patch version exists,
//! make sure the active locale bundle is loaded, take the `(template, data)`
//! pair from the cache or fetch it, then interpolate. Every failure ends on the
//! error fragment and is contained to this one render.

use crate::cache::{CacheEntry, ItemKey, PatchInfo, SharedCache};
use crate::config::{DEFAULT_ERROR_FRAGMENT, DEFAULT_LOADING_FRAGMENT, DISPLAY_ERROR_MESSAGE, NO_PATCH_MESSAGE};
use crate::error::{FetchError, RenderError, TemplateError};
use crate::gateway::FetchGateway;
use crate::inflight::InFlight;
use crate::target::{DataKind, HoverTarget};
use crate::template::{self, Template};
use log::{debug, warn};
use serde_json::{json, Map, Value};
use std::cell::RefCell;

/// Field under which the patch version is merged into item data.
pub const PATCH_FIELD: &str = "patchVersion";
/// Field under which the active locale bundle is exposed to item templates.
pub const LOCALE_FIELD: &str = "locale";

/// A render that ended on the error fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub cause: RenderError,
    pub markup: String,
}

pub struct RenderPipeline {
    gateway: FetchGateway,
    cache: SharedCache,
    locale: RefCell<String>,
    patch_flight: InFlight<(), Result<PatchInfo, FetchError>>,
    locale_flight: InFlight<String, Result<Value, FetchError>>,
    template_flight: InFlight<DataKind, Result<String, FetchError>>,
    data_flight: InFlight<ItemKey, Result<Value, FetchError>>,
}

impl RenderPipeline {
    pub fn new(gateway: FetchGateway, cache: SharedCache, locale: &str) -> Self {
        Self {
            gateway,
            cache,
            locale: RefCell::new(locale.to_string()),
            patch_flight: InFlight::new(),
            locale_flight: InFlight::new(),
            template_flight: InFlight::new(),
            data_flight: InFlight::new(),
        }
    }

    pub fn gateway(&self) -> &FetchGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Locale used for the next render.
    pub fn locale(&self) -> String {
        self.locale.borrow().clone()
    }

    pub fn set_locale(&self, locale: &str) {
        *self.locale.borrow_mut() = locale.to_string();
    }

    /// Fetch the patch version and record the outcome.
    ///
    /// A semantic failure is stored as an errored patch so the next render
    /// shows the server message; a transport failure leaves the state as is.
    pub async fn refresh_patch(&self) -> Result<(), FetchError> {
        let gateway = self.gateway.clone();
        let outcome = self
            .patch_flight
            .run((), move || gateway.fetch_patch_version())
            .await;

        match outcome {
            Ok(patch) => {
                self.cache.borrow_mut().set_patch(patch);
                Ok(())
            }
            Err(FetchError::Semantic(message)) => {
                warn!("Error when retrieving the patch: {}", message);
                self.cache
                    .borrow_mut()
                    .set_patch(PatchInfo::Errored(message.clone()));
                Err(FetchError::Semantic(message))
            }
            Err(err) => {
                warn!("Could not request the patch version: {}", err);
                Err(err)
            }
        }
    }

    /// Fetch a locale bundle. Failed bundles are not cached, so they are retried later.
    pub async fn refresh_locale(&self, locale: &str) -> Result<(), FetchError> {
        debug!("Requesting locale {}", locale);
        let gateway = self.gateway.clone();
        let requested = locale.to_string();
        let outcome = self
            .locale_flight
            .run(locale.to_string(), move || gateway.fetch_locale(&requested))
            .await;

        match outcome {
            Ok(bundle) => {
                self.cache.borrow_mut().put_locale(locale, bundle);
                Ok(())
            }
            Err(err) => {
                warn!("Error when retrieving the locale {}: {}", locale, err);
                Err(err)
            }
        }
    }

    /// Loading fragment with its spinner link filled in.
    pub fn loading_markup(&self) -> String {
        let source = self.cache.borrow().loading_fragment().to_string();
        let context = json!({ "gifLink": self.gateway.loading_gif_url() });
        fill_fragment(&source, DEFAULT_LOADING_FRAGMENT, &context)
    }

    /// Error fragment showing `message`.
    pub fn error_markup(&self, message: &str) -> String {
        let source = self.cache.borrow().error_fragment().to_string();
        fill_fragment(&source, DEFAULT_ERROR_FRAGMENT, &json!({ "error": message }))
    }

    /// Produce the markup for `target`, or the error fragment explaining why not.
    ///
    /// On success the `(template, data)` pair is written through to the cache,
    /// so rendering the same key again performs no request.
    pub async fn render(&self, target: &HoverTarget) -> Result<String, RenderFailure> {
        let version = self.ensure_patch().await.map_err(|cause| self.fail(cause))?;
        let locale = self.locale();
        let bundle = self.ensure_locale(&locale).await;
        let key = ItemKey::new(target.kind, target.id.clone(), locale);

        let cached = self.cache.borrow().get(&key).cloned();
        let entry = match cached {
            Some(entry) => {
                debug!("Loading {} from cache", key);
                entry
            }
            None => {
                let template = self.load_template(key.kind).await.map_err(|source| {
                    self.fail(RenderError::Template {
                        kind: key.kind,
                        source,
                    })
                })?;
                let data = self.load_data(&key).await.map_err(|source| {
                    self.fail(RenderError::Data {
                        kind: key.kind,
                        id: key.id.clone(),
                        source,
                    })
                })?;
                CacheEntry {
                    data: with_patch(data, &version),
                    template,
                }
            }
        };

        debug!("Rendering {} in template", key);
        let markup = render_entry(&entry, bundle).map_err(|err| {
            warn!("Fail to render {}: {}", key, err);
            self.fail(RenderError::Display(err))
        })?;

        debug!("Saving {} in cache", key);
        self.cache.borrow_mut().put(&key, entry);
        Ok(markup)
    }

    async fn ensure_patch(&self) -> Result<String, RenderError> {
        let usable = self
            .cache
            .borrow()
            .patch()
            .and_then(PatchInfo::version)
            .is_some();
        if !usable {
            debug!("Patch empty or errored: requesting patch version");
            // A semantic outcome lands in the cache and is inspected below
            if let Err(err) = self.refresh_patch().await {
                if !err.is_semantic() {
                    if let Some(PatchInfo::Errored(stale)) = self.cache.borrow().patch() {
                        warn!("Patch retry failed, last service error was: {}", stale);
                    }
                    return Err(RenderError::NoPatch);
                }
            }
        }

        match self.cache.borrow().patch() {
            None => Err(RenderError::NoPatch),
            Some(PatchInfo::Errored(message)) => Err(RenderError::Patch(message.clone())),
            Some(PatchInfo::Version(version)) => Ok(version.clone()),
        }
    }

    async fn ensure_locale(&self, locale: &str) -> Value {
        if self.cache.borrow().locale(locale).is_none() {
            // Rendering continues without translations when the bundle is unavailable
            let _ = self.refresh_locale(locale).await;
        }
        self.cache
            .borrow()
            .locale(locale)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    async fn load_template(&self, kind: DataKind) -> Result<String, FetchError> {
        debug!("Requesting {} template", kind);
        let gateway = self.gateway.clone();
        self.template_flight
            .run(kind, move || gateway.fetch_item_template(kind))
            .await
    }

    async fn load_data(&self, key: &ItemKey) -> Result<Value, FetchError> {
        debug!("Requesting {} datas", key);
        let gateway = self.gateway.clone();
        let request = key.clone();
        self.data_flight
            .run(key.clone(), move || gateway.fetch_item_data(&request))
            .await
    }

    fn fail(&self, cause: RenderError) -> RenderFailure {
        let markup = self.error_markup(&user_message(&cause));
        RenderFailure { cause, markup }
    }
}

/// Text shown in the error fragment for a failed render.
pub fn user_message(cause: &RenderError) -> String {
    match cause {
        RenderError::NoPatch => NO_PATCH_MESSAGE.to_string(),
        RenderError::Patch(message) => message.clone(),
        RenderError::Template { kind, .. } => format!("Can't request {}.html", kind),
        RenderError::Data {
            source: FetchError::Semantic(message),
            ..
        } => message.clone(),
        RenderError::Data { kind, id, .. } => format!("Can't request {}/{}", kind, id),
        RenderError::Display(_) => DISPLAY_ERROR_MESSAGE.to_string(),
    }
}

fn with_patch(mut data: Value, version: &str) -> Value {
    if let Value::Object(map) = &mut data {
        map.insert(PATCH_FIELD.to_string(), json!({ "version": version }));
    }
    data
}

fn render_entry(entry: &CacheEntry, bundle: Value) -> Result<String, TemplateError> {
    let mut context = match &entry.data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    context.insert(LOCALE_FIELD.to_string(), bundle);
    Template::compile(&entry.template)?.render(&Value::Object(context))
}

fn fill_fragment(source: &str, fallback: &str, context: &Value) -> String {
    template::render(source, context)
        .or_else(|err| {
            warn!("Fragment failed to render ({}), using the built-in one", err);
            template::render(fallback, context)
        })
        .unwrap_or_default()
}
