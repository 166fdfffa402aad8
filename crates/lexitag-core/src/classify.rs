//! Case-insensitive substring matching of a text against one term set.
//!
//! Terms are tried longest first for a stable iteration order and early
//! exit. Containment is not span-consuming, so the order never changes
//! whether a text matches.

use crate::dictionary::TermSet;

/// A term set's terms in match order, built once per run.
///
/// Each entry pairs the case-folded term used for matching with the
/// spelling the dictionary stores, which is what detections report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTerms {
    ordered: Vec<(String, String)>,
}

impl CompiledTerms {
    pub fn new(terms: &TermSet) -> Self {
        Self {
            ordered: terms
                .match_order()
                .into_iter()
                .map(|(folded, stored)| (folded.to_string(), stored.to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// 1 if any term occurs in `text`, else 0. Missing text never matches.
    pub fn classify(&self, text: Option<&str>) -> u8 {
        let Some(text) = text else {
            return 0;
        };
        let folded = text.to_lowercase();
        u8::from(
            self.ordered
                .iter()
                .any(|(term, _)| folded.contains(term.as_str())),
        )
    }

    /// Every term found in `text`, in match order, as stored.
    pub fn detect(&self, text: Option<&str>) -> Detection {
        let Some(text) = text else {
            return Detection::default();
        };
        let folded = text.to_lowercase();
        Detection {
            matched: self
                .ordered
                .iter()
                .filter(|(term, _)| folded.contains(term.as_str()))
                .map(|(_, stored)| stored.clone())
                .collect(),
        }
    }
}

/// Which terms of a dictionary were found in one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    matched: Vec<String>,
}

impl Detection {
    pub fn flag(&self) -> u8 {
        u8::from(!self.matched.is_empty())
    }

    pub fn count(&self) -> usize {
        self.matched.len()
    }

    pub fn matches(&self) -> &[String] {
        &self.matched
    }
}

/// Detection flag for a single text against a single term set.
pub fn classify_text(text: Option<&str>, terms: &TermSet) -> u8 {
    CompiledTerms::new(terms).classify(text)
}

/// All matched terms for a single text against a single term set.
pub fn detect(text: Option<&str>, terms: &TermSet) -> Detection {
    CompiledTerms::new(terms).detect(text)
}
