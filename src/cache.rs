//! Process-lifetime store for everything fetched from the tooltip service.
//!
//! Entries are never evicted or expired: reference data is assumed stable for
//! a page session. A successful re-fetch of the same key overwrites in place.
//!
//! # Slots
//! - `patch`: current patch metadata, absent until fetched once
//! - `locales`: translation bundles keyed by locale code
//! - `loading` / `error`: fragment templates, seeded with built-in defaults
//! - `items`: per data kind, `(template, data)` pairs keyed by `{id}_{locale}`

use crate::config::{DEFAULT_ERROR_FRAGMENT, DEFAULT_LOADING_FRAGMENT};
use crate::target::DataKind;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Cache shared by the render pipeline and the bootstrap loader.
pub type SharedCache = Rc<RefCell<DataCache>>;

/// Patch metadata as last reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchInfo {
    Version(String),
    Errored(String),
}

impl PatchInfo {
    pub fn version(&self) -> Option<&str> {
        match self {
            PatchInfo::Version(version) => Some(version),
            PatchInfo::Errored(_) => None,
        }
    }
}

/// Identity of one rendered tooltip: data kind, identifier and locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub kind: DataKind,
    pub id: String,
    pub locale: String,
}

impl ItemKey {
    pub fn new(kind: DataKind, id: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            locale: locale.into(),
        }
    }

    /// Key within the data kind's table.
    pub fn slot(&self) -> String {
        format!("{}_{}", self.id, self.locale)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.slot())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    pub template: String,
}

#[derive(Debug)]
pub struct DataCache {
    patch: Option<PatchInfo>,
    locales: HashMap<String, Value>,
    loading_fragment: String,
    error_fragment: String,
    items: HashMap<DataKind, HashMap<String, CacheEntry>>,
}

impl Default for DataCache {
    fn default() -> Self {
        Self {
            patch: None,
            locales: HashMap::new(),
            loading_fragment: DEFAULT_LOADING_FRAGMENT.to_string(),
            error_fragment: DEFAULT_ERROR_FRAGMENT.to_string(),
            items: HashMap::with_capacity(DataKind::ALL.len()),
        }
    }
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedCache {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn patch(&self) -> Option<&PatchInfo> {
        self.patch.as_ref()
    }

    pub fn set_patch(&mut self, patch: PatchInfo) {
        self.patch = Some(patch);
    }

    pub fn locale(&self, locale: &str) -> Option<&Value> {
        self.locales.get(locale)
    }

    pub fn put_locale(&mut self, locale: impl Into<String>, bundle: Value) {
        self.locales.insert(locale.into(), bundle);
    }

    pub fn loading_fragment(&self) -> &str {
        &self.loading_fragment
    }

    pub fn set_loading_fragment(&mut self, fragment: String) {
        self.loading_fragment = fragment;
    }

    pub fn error_fragment(&self) -> &str {
        &self.error_fragment
    }

    pub fn set_error_fragment(&mut self, fragment: String) {
        self.error_fragment = fragment;
    }

    pub fn get(&self, key: &ItemKey) -> Option<&CacheEntry> {
        self.items.get(&key.kind)?.get(&key.slot())
    }

    pub fn put(&mut self, key: &ItemKey, entry: CacheEntry) {
        self.items
            .entry(key.kind)
            .or_default()
            .insert(key.slot(), entry);
    }

    /// Number of cached `(template, data)` pairs across all data kinds.
    pub fn item_count(&self) -> usize {
        self.items.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fragments_start_with_builtin_defaults() {
        let cache = DataCache::new();
        assert_eq!(cache.loading_fragment(), DEFAULT_LOADING_FRAGMENT);
        assert_eq!(cache.error_fragment(), DEFAULT_ERROR_FRAGMENT);
        assert!(cache.patch().is_none());
    }

    #[test]
    fn items_are_keyed_by_kind_id_and_locale() {
        let mut cache = DataCache::new();
        let key = ItemKey::new(DataKind::Item, "1001", "en_US");
        let entry = CacheEntry {
            data: json!({ "name": "Boots of Speed" }),
            template: "<%= name %>".into(),
        };
        cache.put(&key, entry.clone());

        assert_eq!(cache.get(&key), Some(&entry));
        assert!(cache.get(&ItemKey::new(DataKind::Item, "1001", "fr_FR")).is_none());
        assert!(cache.get(&ItemKey::new(DataKind::Rune, "1001", "en_US")).is_none());
        assert_eq!(cache.item_count(), 1);
        assert_eq!(key.to_string(), "item/1001_en_US");
    }

    #[test]
    fn refetch_overwrites_existing_entry() {
        let mut cache = DataCache::new();
        let key = ItemKey::new(DataKind::Champion, "Ahri", "en_US");
        for title in ["old", "new"] {
            cache.put(
                &key,
                CacheEntry {
                    data: json!({ "title": title }),
                    template: String::new(),
                },
            );
        }

        assert_eq!(cache.get(&key).map(|e| &e.data), Some(&json!({ "title": "new" })));
        assert_eq!(cache.item_count(), 1);
    }
}
