//! Named term dictionaries and the store that owns them.
//!
//! A store is an explicitly owned value: each session builds its own and
//! hands snapshots of it to the classification engine.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LexitagError, ValidationError};

/// Name of the built-in urgency dictionary.
pub const URGENCY_MARKETING: &str = "urgency_marketing";

/// Name of the built-in exclusivity dictionary.
pub const EXCLUSIVE_MARKETING: &str = "exclusive_marketing";

const URGENCY_TERMS: &[&str] = &[
    "limited",
    "limited time",
    "limited run",
    "limited edition",
    "order now",
    "last chance",
    "hurry",
    "while supplies last",
    "before they're gone",
    "selling out",
    "selling fast",
    "act now",
    "don't wait",
    "today only",
    "expires soon",
    "final hours",
    "almost gone",
];

const EXCLUSIVE_TERMS: &[&str] = &[
    "exclusive",
    "exclusively",
    "exclusive offer",
    "exclusive deal",
    "members only",
    "vip",
    "special access",
    "invitation only",
    "premium",
    "privileged",
    "limited access",
    "select customers",
    "insider",
    "private sale",
    "early access",
];

/// Built-in dictionaries, seeded in this order.
const DEFAULT_DICTIONARIES: &[(&str, &[&str])] = &[
    (URGENCY_MARKETING, URGENCY_TERMS),
    (EXCLUSIVE_MARKETING, EXCLUSIVE_TERMS),
];

/// A set of unique, trimmed terms.
///
/// Terms are keyed by their case-folded form, so `VIP` and `vip` are one
/// term. The first spelling seen is kept for display and match reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TermSet(BTreeMap<String, String>);

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a term set from a raw multi-line blob: one term per line,
    /// trimmed, blank lines dropped, duplicates collapsed.
    pub fn parse(raw: &str) -> Self {
        raw.lines().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive membership.
    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(&term.trim().to_lowercase())
    }

    /// Stored spellings, ordered by folded form.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// `(folded, stored)` pairs ordered longest first, ties broken
    /// lexicographically on the folded form.
    ///
    /// Recomputed on every call; the stored set stays the authority.
    pub fn match_order(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> = self
            .0
            .iter()
            .map(|(folded, stored)| (folded.as_str(), stored.as_str()))
            .collect();
        ordered.sort_by_key(|(folded, _)| (Reverse(folded.chars().count()), *folded));
        ordered
    }
}

impl<S: AsRef<str>> FromIterator<S> for TermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut terms = BTreeMap::new();
        for term in iter {
            let term = term.as_ref().trim();
            if term.is_empty() {
                continue;
            }
            terms
                .entry(term.to_lowercase())
                .or_insert_with(|| term.to_string());
        }
        Self(terms)
    }
}

impl From<Vec<String>> for TermSet {
    fn from(terms: Vec<String>) -> Self {
        terms.into_iter().collect()
    }
}

impl From<TermSet> for Vec<String> {
    fn from(terms: TermSet) -> Self {
        terms.0.into_values().collect()
    }
}

/// A named term set used for one classification category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    name: String,
    terms: TermSet,
}

impl Dictionary {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Column that carries this dictionary's detection flag.
    pub fn flag_column(&self) -> String {
        format!("{}_detected", self.name)
    }
}

/// Normalize a raw dictionary name to `[a-z0-9_]`.
///
/// Lowercases, then replaces every other character with `_`. Surrounding
/// whitespace is dropped first so a padded blank name stays empty.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Ordered mapping from dictionary name to term set.
///
/// Iteration order is insertion order. Built-ins come first when the store
/// is initialized before any user additions.
#[derive(Debug, Clone, Default)]
pub struct DictionaryStore {
    dictionaries: Vec<Dictionary>,
    seeded: bool,
}

impl DictionaryStore {
    /// An empty store with no built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the built-in dictionaries.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.initialize();
        store
    }

    /// Seed the built-in dictionaries.
    ///
    /// Runs once per store. Later calls are no-ops, and a built-in name the
    /// caller already holds is left as is.
    pub fn initialize(&mut self) {
        if self.seeded {
            debug!("Dictionary store already initialized");
            return;
        }

        for (name, terms) in DEFAULT_DICTIONARIES {
            if self.contains(name) {
                debug!(name, "Keeping caller-supplied dictionary over built-in");
                continue;
            }
            self.dictionaries.push(Dictionary {
                name: (*name).to_string(),
                terms: terms.iter().collect(),
            });
        }

        self.seeded = true;
        debug!(count = self.dictionaries.len(), "Seeded built-in dictionaries");
    }

    /// Overwrite the named dictionary's terms wholesale, adding it at the
    /// end if it does not exist yet.
    ///
    /// `name` must already be normalized; an empty term set is allowed.
    pub fn replace(&mut self, name: &str, terms: TermSet) -> Result<(), LexitagError> {
        if !is_valid_name(name) {
            return Err(ValidationError::InvalidName(name.to_string()).into());
        }

        match self.dictionaries.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                debug!(name, terms = terms.len(), "Replaced dictionary");
                existing.terms = terms;
            }
            None => {
                debug!(name, terms = terms.len(), "Added dictionary");
                self.dictionaries.push(Dictionary {
                    name: name.to_string(),
                    terms,
                });
            }
        }
        Ok(())
    }

    /// Create (or replace) a dictionary from a raw name and a raw
    /// newline-separated term blob. Returns the normalized name.
    pub fn create(&mut self, raw_name: &str, raw_terms: &str) -> Result<String, LexitagError> {
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return Err(ValidationError::InvalidName(raw_name.to_string()).into());
        }
        self.replace(&name, TermSet::parse(raw_terms))?;
        Ok(name)
    }

    /// Remove a dictionary by name.
    pub fn remove(&mut self, name: &str) -> Result<Dictionary, LexitagError> {
        let pos = self
            .dictionaries
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| ValidationError::UnknownDictionary(name.to_string()))?;
        Ok(self.dictionaries.remove(pos))
    }

    /// Read-only view in iteration order.
    pub fn list(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    pub fn get(&self, name: &str) -> Option<&Dictionary> {
        self.dictionaries.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }

    /// Owned copy for a classification run.
    pub fn snapshot(&self) -> Vec<Dictionary> {
        self.dictionaries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(store: &DictionaryStore) -> Vec<&str> {
        store.list().iter().map(Dictionary::name).collect()
    }

    #[test]
    fn test_parse_trims_and_dedupes() {
        let terms = TermSet::parse("  foo \r\n\nbar\r\nfoo\n   \n");
        assert_eq!(terms.len(), 2);
        assert!(terms.contains("foo"));
        assert!(terms.contains("bar"));
    }

    #[test]
    fn test_match_order_longest_first() {
        let terms: TermSet = ["vip", "Members Only", "exclusive", "insider"]
            .into_iter()
            .collect();
        assert_eq!(
            terms.match_order(),
            vec![
                ("members only", "Members Only"),
                ("exclusive", "exclusive"),
                ("insider", "insider"),
                ("vip", "vip"),
            ]
        );
    }

    #[test]
    fn test_case_variants_collapse_to_first_spelling() {
        let terms = TermSet::parse("VIP\nvip\nFlash Sale\nflash sale");
        assert_eq!(terms.len(), 2);
        assert!(terms.contains("Vip"));
        assert_eq!(terms.iter().collect::<Vec<_>>(), vec!["Flash Sale", "VIP"]);
        assert_eq!(
            terms.match_order(),
            vec![("flash sale", "Flash Sale"), ("vip", "VIP")]
        );
    }

    #[test]
    fn test_term_set_serializes_as_list() {
        let terms = TermSet::parse("VIP\nmembers only");
        let json = serde_json::to_value(&terms).unwrap();
        assert_eq!(json, serde_json::json!(["members only", "VIP"]));

        let back: TermSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, terms);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("New Tier!!"), "new_tier__");
        assert_eq!(normalize_name("Scarcity_2"), "scarcity_2");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_create_normalizes_and_collapses_duplicates() {
        let mut store = DictionaryStore::new();
        let name = store.create("New Tier!!", "foo\nbar\nfoo").unwrap();
        assert_eq!(name, "new_tier__");

        let dict = store.get("new_tier__").unwrap();
        assert_eq!(dict.terms().len(), 2);
        assert!(dict.terms().contains("foo"));
        assert!(dict.terms().contains("bar"));
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut store = DictionaryStore::with_defaults();
        let before = store.snapshot();

        let err = store.create("  ", "").unwrap_err();
        assert!(matches!(
            err,
            LexitagError::Validation(ValidationError::InvalidName(_))
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_create_allows_empty_terms() {
        let mut store = DictionaryStore::new();
        store.create("quiet", "\n\n").unwrap();
        assert!(store.get("quiet").unwrap().terms().is_empty());
    }

    #[test]
    fn test_replace_rejects_unnormalized_name() {
        let mut store = DictionaryStore::new();
        assert!(store.replace("Bad Name", TermSet::new()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = DictionaryStore::with_defaults();
        store
            .replace(URGENCY_MARKETING, TermSet::parse("flash sale"))
            .unwrap();

        let terms = store.get(URGENCY_MARKETING).unwrap().terms();
        assert_eq!(terms.len(), 1);
        assert!(terms.contains("flash sale"));
        assert!(!terms.contains("hurry"));
    }

    #[test]
    fn test_initialize_seeds_builtins_in_order() {
        let store = DictionaryStore::with_defaults();
        assert_eq!(names(&store), vec![URGENCY_MARKETING, EXCLUSIVE_MARKETING]);
        assert_eq!(store.get(URGENCY_MARKETING).unwrap().terms().len(), 17);
        assert_eq!(store.get(EXCLUSIVE_MARKETING).unwrap().terms().len(), 15);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut store = DictionaryStore::with_defaults();
        store
            .replace(EXCLUSIVE_MARKETING, TermSet::parse("vip"))
            .unwrap();
        store.create("scarcity", "only 3 left").unwrap();

        store.initialize();

        assert_eq!(
            names(&store),
            vec![URGENCY_MARKETING, EXCLUSIVE_MARKETING, "scarcity"]
        );
        assert_eq!(store.get(EXCLUSIVE_MARKETING).unwrap().terms().len(), 1);
    }

    #[test]
    fn test_initialize_keeps_caller_dictionary() {
        let mut store = DictionaryStore::new();
        store.create(URGENCY_MARKETING, "now or never").unwrap();
        store.initialize();

        let terms = store.get(URGENCY_MARKETING).unwrap().terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_user_dictionaries_follow_creation_order() {
        let mut store = DictionaryStore::with_defaults();
        store.create("zeta", "z").unwrap();
        store.create("alpha", "a").unwrap();
        assert_eq!(
            names(&store),
            vec![URGENCY_MARKETING, EXCLUSIVE_MARKETING, "zeta", "alpha"]
        );
    }

    #[test]
    fn test_remove_does_not_resurrect_on_initialize() {
        let mut store = DictionaryStore::with_defaults();
        store.remove(URGENCY_MARKETING).unwrap();
        store.initialize();
        assert_eq!(names(&store), vec![EXCLUSIVE_MARKETING]);

        assert!(matches!(
            store.remove("missing"),
            Err(LexitagError::Validation(ValidationError::UnknownDictionary(_)))
        ));
    }

    #[test]
    fn test_flag_column() {
        let store = DictionaryStore::with_defaults();
        assert_eq!(
            store.list()[0].flag_column(),
            "urgency_marketing_detected"
        );
    }
}
