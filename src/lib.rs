//! Normalizes legacy PBX dialing patterns into literal digit patterns for
//! cloud calling dial plans.
//!
//! A raw pattern may carry one bracket expression (`408555[0-2]000`);
//! normalization expands it into one literal pattern per matching digit
//! and resolves overlaps between patterns with a more-specific-wins rule.

pub mod normalizer;
pub mod records;
pub mod regexp_cache;

pub use normalizer::{normalize_catalogs, CatalogSummary, Conflict, NormalizeOutcome};
pub use regexp_cache::RegexCache;
