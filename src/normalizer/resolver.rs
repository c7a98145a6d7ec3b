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
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use log::warn;

use crate::regexp_cache::RegexCache;

use super::{errors::ExpandError, expander::expand};

/// One origin's outcome inside a resolved conflict group: the raw pattern
/// is withdrawn from the catalog and the listed literals stand in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub catalog: String,
    pub pattern: String,
    /// Final literal patterns the origin keeps, sorted ascending. Empty
    /// when every expansion was claimed by more specific siblings.
    pub replaced_with: Vec<String>,
}

/// A resolved conflict group: all raw patterns whose expansions met on one
/// normalized pattern, ordered most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The normalized pattern the origins collided on.
    pub normalized: String,
    /// Distinct origin raw patterns, ascending by full-expansion size;
    /// equal sizes are ordered lexicographically so runs are reproducible.
    pub origin_patterns: Vec<String>,
    pub replacements: Vec<Replacement>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conflict resolution: {}", self.origin_patterns.join(", "))?;
        for replacement in &self.replacements {
            writeln!(
                f,
                " Replacing pattern {} in catalog \"{}\" with {}",
                replacement.pattern,
                replacement.catalog,
                replacement.replaced_with.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Outcome of a conflict-resolution pass over all catalogs.
pub struct Resolution {
    pub conflicts: Vec<Conflict>,
    /// `(catalog, pattern)` pairs rejected for illegal syntax, in catalog
    /// order. Reported once here; later passes skip them quietly.
    pub illegal: Vec<(String, String)>,
}

/// Detects and resolves normalization conflicts across all catalogs.
///
/// Conflicts are global: a pattern from one catalog can collide with a
/// pattern from another. Each conflicted raw pattern is replaced, inside
/// every catalog that carries it, by the literal patterns it keeps after
/// the more-specific-wins sweep.
///
/// Reduction state is shared across conflict groups: a broad pattern that
/// collides with several narrower ones loses the overlap to each of them,
/// so after resolution no literal pattern is claimed by two distinct raw
/// patterns anywhere in the universe.
pub fn resolve_conflicts(
    grouped: &mut BTreeMap<String, BTreeSet<String>>,
    cache: &RegexCache,
) -> Result<Resolution, ExpandError> {
    let mut origins: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    let mut illegal = Vec::new();

    for (catalog, raw_patterns) in grouped.iter() {
        for raw in raw_patterns {
            for item in expand([raw.as_str()], cache) {
                match item {
                    Ok(normalized) => origins
                        .entry(normalized)
                        .or_default()
                        .push((catalog.clone(), raw.clone())),
                    Err(err) if err.is_recoverable() => {
                        warn!("{err}");
                        illegal.push((catalog.clone(), raw.clone()));
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }

    // Normalized patterns produced by more than one origin.
    let duplicates: Vec<(&String, &Vec<(String, String)>)> = origins
        .iter()
        .filter(|(_, origin_list)| origin_list.len() > 1)
        .collect();

    // Expansion sets shared across all duplicate groups; sweeps only ever
    // shrink them. Specificity ordering uses the untouched full size.
    let mut reduced: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut full_size: HashMap<String, usize> = HashMap::new();

    let mut groups: Vec<(String, Vec<String>, Vec<(String, String)>)> = Vec::new();

    for (normalized, origin_list) in duplicates {
        let mut origin_patterns: Vec<String> = Vec::new();
        for (_, raw) in origin_list {
            if !origin_patterns.contains(raw) {
                origin_patterns.push(raw.clone());
            }
        }

        for raw in &origin_patterns {
            if !reduced.contains_key(raw) {
                // Origins expanded cleanly in the pass above, so the only
                // possible error here is the fatal one.
                let expansion: BTreeSet<String> =
                    expand([raw.as_str()], cache).collect::<Result<_, _>>()?;
                full_size.insert(raw.clone(), expansion.len());
                reduced.insert(raw.clone(), expansion);
            }
        }

        origin_patterns.sort_by(|a, b| full_size[a].cmp(&full_size[b]).then_with(|| a.cmp(b)));

        for i in 0..origin_patterns.len().saturating_sub(1) {
            let winner = reduced[&origin_patterns[i]].clone();
            for loser in &origin_patterns[i + 1..] {
                if let Some(set) = reduced.get_mut(loser) {
                    set.retain(|pattern| !winner.contains(pattern));
                }
            }
        }

        groups.push((normalized.clone(), origin_patterns, origin_list.clone()));
    }

    // Only after every sweep ran are the final sets known; now swap the
    // conflicted raw patterns for their surviving literals.
    let mut conflicts = Vec::with_capacity(groups.len());
    for (normalized, origin_patterns, origin_list) in groups {
        let mut replacements = Vec::with_capacity(origin_list.len());
        for (catalog, raw) in origin_list {
            let replaced_with: Vec<String> = reduced[&raw].iter().cloned().collect();
            if let Some(catalog_patterns) = grouped.get_mut(&catalog) {
                catalog_patterns.remove(&raw);
                catalog_patterns.extend(replaced_with.iter().cloned());
            }
            replacements.push(Replacement {
                catalog,
                pattern: raw,
                replaced_with,
            });
        }
        conflicts.push(Conflict {
            normalized,
            origin_patterns,
            replacements,
        });
    }

    Ok(Resolution { conflicts, illegal })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use crate::regexp_cache::RegexCache;

    use super::resolve_conflicts;

    fn grouped(entries: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
        entries
            .iter()
            .map(|(catalog, patterns)| {
                (
                    catalog.to_string(),
                    patterns.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    fn patterns_of(map: &BTreeMap<String, BTreeSet<String>>, catalog: &str) -> Vec<String> {
        map[catalog].iter().cloned().collect()
    }

    #[test]
    fn disjoint_expansions_produce_no_conflict() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["408555[0-2]000"]), ("B", &["408555[5-9]000"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        assert!(resolution.conflicts.is_empty());
        assert_eq!(patterns_of(&map, "A"), vec!["408555[0-2]000"]);
        assert_eq!(patterns_of(&map, "B"), vec!["408555[5-9]000"]);
    }

    #[test]
    fn narrower_origin_keeps_the_overlap() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["408555[0-9]000"]), ("B", &["4085550000"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();

        assert_eq!(resolution.conflicts.len(), 1);
        let conflict = &resolution.conflicts[0];
        assert_eq!(conflict.normalized, "4085550000");
        assert_eq!(conflict.origin_patterns, vec!["4085550000", "408555[0-9]000"]);

        // B is more specific and keeps the literal; A is left with the
        // other nine expansions.
        assert_eq!(patterns_of(&map, "B"), vec!["4085550000"]);
        let a = patterns_of(&map, "A");
        assert_eq!(a.len(), 9);
        assert!(!a.contains(&"4085550000".to_string()));
        assert!(a.contains(&"4085559000".to_string()));
    }

    #[test]
    fn conflicts_are_detected_across_catalogs() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["91[01]"]), ("B", &["910"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        assert_eq!(resolution.conflicts.len(), 1);
        assert_eq!(patterns_of(&map, "A"), vec!["911"]);
        assert_eq!(patterns_of(&map, "B"), vec!["910"]);
    }

    #[test]
    fn equal_specificity_ties_break_lexicographically() {
        let cache = RegexCache::new();
        // Both expand to two patterns and overlap on "10"; "1[05]" sorts
        // before "[12]0" and wins the overlap.
        let mut map = grouped(&[("A", &["1[05]"]), ("B", &["[12]0"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        assert_eq!(
            resolution.conflicts[0].origin_patterns,
            vec!["1[05]", "[12]0"]
        );
        assert_eq!(patterns_of(&map, "A"), vec!["10", "15"]);
        assert_eq!(patterns_of(&map, "B"), vec!["20"]);
    }

    #[test]
    fn broad_pattern_loses_to_each_narrow_sibling() {
        let cache = RegexCache::new();
        // "5[0-9]" collides with "50" and "51" in separate groups; the
        // reductions accumulate so no literal ends up claimed twice.
        let mut map = grouped(&[("A", &["5[0-9]"]), ("B", &["50"]), ("C", &["51"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        assert_eq!(resolution.conflicts.len(), 2);

        let a = patterns_of(&map, "A");
        assert_eq!(a.len(), 8);
        assert!(!a.contains(&"50".to_string()));
        assert!(!a.contains(&"51".to_string()));
        assert_eq!(patterns_of(&map, "B"), vec!["50"]);
        assert_eq!(patterns_of(&map, "C"), vec!["51"]);

        // Global invariant: every literal belongs to exactly one origin.
        let mut seen = BTreeSet::new();
        for catalog in ["A", "B", "C"] {
            for pattern in patterns_of(&map, catalog) {
                assert!(seen.insert(pattern.clone()), "{pattern} claimed twice");
            }
        }
    }

    #[test]
    fn same_raw_pattern_in_two_catalogs_is_not_self_destructive() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["9[01]"]), ("B", &["9[01]"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        // Two origin entries but a single distinct raw pattern: nothing to
        // sweep, both catalogs keep the full expansion.
        assert_eq!(resolution.conflicts.len(), 2);
        assert_eq!(patterns_of(&map, "A"), vec!["90", "91"]);
        assert_eq!(patterns_of(&map, "B"), vec!["90", "91"]);
    }

    #[test]
    fn illegal_patterns_are_collected_not_fatal() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["555*1234", "5551000"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        assert_eq!(
            resolution.illegal,
            vec![("A".to_string(), "555*1234".to_string())]
        );
        assert!(resolution.conflicts.is_empty());
    }

    #[test]
    fn malformed_bracket_aborts_resolution() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["55[2-0]"])]);
        assert!(resolve_conflicts(&mut map, &cache).is_err());
    }

    #[test]
    fn conflict_report_lists_origins_and_replacements() {
        let cache = RegexCache::new();
        let mut map = grouped(&[("A", &["1[01]"]), ("B", &["10"])]);
        let resolution = resolve_conflicts(&mut map, &cache).unwrap();
        let rendered = resolution.conflicts[0].to_string();
        assert!(rendered.starts_with("Conflict resolution: 10, 1[01]\n"));
        assert!(rendered.contains(" Replacing pattern 1[01] in catalog \"A\" with 11\n"));
        assert!(rendered.contains(" Replacing pattern 10 in catalog \"B\" with 10\n"));
    }
}
