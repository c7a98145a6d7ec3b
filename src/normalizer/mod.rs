mod catalog;
mod expander;
mod resolver;
pub mod errors;

pub use catalog::{normalize_catalogs, CatalogSummary, NormalizeOutcome};
pub use expander::{expand, Expand};
pub use resolver::{resolve_conflicts, Conflict, Replacement, Resolution};
