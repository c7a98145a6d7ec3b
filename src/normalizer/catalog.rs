// Copyright (C) 2026 dialnorm maintainers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::regexp_cache::RegexCache;

use super::{
    errors::ExpandError,
    expander::expand,
    resolver::{resolve_conflicts, Conflict, Resolution},
};

/// Before/after pattern counts for one catalog.
///
/// `patterns_before` counts the raw patterns as loaded, before conflict
/// resolution rewrote any of them; `patterns_after` counts the final
/// deduplicated literal patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub catalog: String,
    pub patterns_before: usize,
    pub patterns_after: usize,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} patterns normalized to {} patterns",
            self.catalog, self.patterns_before, self.patterns_after
        )
    }
}

/// Full result of a normalization run.
pub struct NormalizeOutcome {
    /// Final literal patterns per catalog, deduplicated and sorted
    /// ascending.
    pub patterns: BTreeMap<String, Vec<String>>,
    pub conflicts: Vec<Conflict>,
    /// `(catalog, pattern)` pairs skipped for illegal syntax.
    pub illegal: Vec<(String, String)>,
    pub summaries: Vec<CatalogSummary>,
}

impl NormalizeOutcome {
    /// Totals across all catalogs as `(before, after)`.
    pub fn totals(&self) -> (usize, usize) {
        self.summaries.iter().fold((0, 0), |(before, after), s| {
            (before + s.patterns_before, after + s.patterns_after)
        })
    }
}

/// Runs the whole pipeline over `(catalog, pattern)` records: group per
/// catalog, resolve conflicts globally, then expand each catalog's
/// (possibly rewritten) pattern set into its final sorted literal list.
///
/// Illegal patterns are reported and skipped; only a bracket expression
/// outside the supported character-class grammar aborts the run.
pub fn normalize_catalogs<I>(records: I) -> Result<NormalizeOutcome, ExpandError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let cache = RegexCache::new();

    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (catalog, pattern) in records {
        grouped.entry(catalog).or_default().insert(pattern);
    }
    let raw_counts: Vec<(String, usize)> = grouped
        .iter()
        .map(|(catalog, raw_patterns)| (catalog.clone(), raw_patterns.len()))
        .collect();

    let Resolution { conflicts, illegal } = resolve_conflicts(&mut grouped, &cache)?;

    let mut patterns = BTreeMap::new();
    let mut summaries = Vec::with_capacity(raw_counts.len());
    for (catalog, patterns_before) in raw_counts {
        let mut normalized = BTreeSet::new();
        for item in expand(grouped[&catalog].iter(), &cache) {
            match item {
                Ok(pattern) => {
                    normalized.insert(pattern);
                }
                // Already reported during conflict detection.
                Err(err) if err.is_recoverable() => {}
                Err(err) => return Err(err),
            }
        }
        let normalized: Vec<String> = normalized.into_iter().collect();
        summaries.push(CatalogSummary {
            catalog: catalog.clone(),
            patterns_before,
            patterns_after: normalized.len(),
        });
        patterns.insert(catalog, normalized);
    }

    Ok(NormalizeOutcome {
        patterns,
        conflicts,
        illegal,
        summaries,
    })
}
