use std::sync::Arc;

use dashmap::DashMap;
use fast_cat::concat_str;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("An error occurred while trying to compile bracket expression: {0}")]
pub struct InvalidRegexError(#[from] regex::Error);

/// Cache of compiled bracket character classes.
///
/// The same bracket expression is re-expanded in up to three passes
/// (conflict detection, per-origin expansion, final catalog expansion),
/// so compiled matchers are kept keyed by the class text.
///
/// Matchers are anchored on both ends: a class only ever decides whether a
/// single digit belongs to it, never whether it occurs somewhere inside a
/// longer string.
pub struct RegexCache {
    cache: DashMap<String, Arc<regex::Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the anchored matcher for a bracket expression, compiling and
    /// caching it on first use. A class the regex engine rejects (reversed
    /// range, unbalanced bracket) is the caller's fatal case.
    pub fn class_matcher(&self, class: &str) -> Result<Arc<regex::Regex>, InvalidRegexError> {
        if let Some(regex) = self.cache.get(class) {
            Ok(regex.value().clone())
        } else {
            let entry = self.cache.entry(class.to_string()).or_try_insert_with(|| {
                regex::Regex::new(&concat_str!("^(?:", class, ")$")).map(Arc::new)
            })?;
            Ok(entry.value().clone())
        }
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new()
    }
}
