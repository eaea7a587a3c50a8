//! Literal strings that must never be translated (storefront UI chrome).

use std::collections::HashSet;

const DEFAULT_ENTRIES: [&str; 5] = ["Add to cart", "Checkout", "SKU", "cart", "Cart"];

/// Exact-match set of strings that pass through translation unchanged.
#[derive(Debug, Clone)]
pub struct SkipList {
    entries: HashSet<String>,
}

impl SkipList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-sensitive, whole-string membership test
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(text)
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES)
    }
}
