//! Hover target resolution: which kind of reference data an element asks for.

use std::collections::HashMap;
use std::fmt;

/// Categories of reference data the service can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Champion,
    Item,
    SummonerSpell,
    Rune,
    Mastery,
    ChampionSpell,
}

impl DataKind {
    /// Canonical scan order used when resolving a hover target.
    pub const ALL: [DataKind; 6] = [
        DataKind::Champion,
        DataKind::Item,
        DataKind::SummonerSpell,
        DataKind::Rune,
        DataKind::Mastery,
        DataKind::ChampionSpell,
    ];

    /// Name used both as the `data-*` attribute and as the service path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Champion => "champion",
            DataKind::Item => "item",
            DataKind::SummonerSpell => "summonerspell",
            DataKind::Rune => "rune",
            DataKind::Mastery => "mastery",
            DataKind::ChampionSpell => "championspell",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to an element's `data-*` attributes, keyed without the `data-` prefix.
pub trait Dataset {
    fn get(&self, key: &str) -> Option<String>;
}

impl Dataset for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// A resolved request: one data kind plus the identifier within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    pub kind: DataKind,
    pub id: String,
}

/// Resolve the data kind an element names.
///
/// Every kind in [`DataKind::ALL`] is checked and each non-empty match overwrites
/// the previous one, so when an element carries several kinds the last one in
/// canonical order wins. Returns `None` when no recognized attribute is set.
pub fn resolve(dataset: &dyn Dataset) -> Option<HoverTarget> {
    let mut resolved = None;
    for kind in DataKind::ALL {
        if let Some(id) = dataset.get(kind.as_str()).filter(|id| !id.is_empty()) {
            resolved = Some(HoverTarget { kind, id });
        }
    }
    resolved
}
