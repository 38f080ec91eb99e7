//! Maps catalog task names to suite selection expressions.
//!
//! The grade endpoint accepts a task name so that clients never need to know
//! the suite's filter syntax. Anything the catalog does not recognise passes
//! through verbatim, which keeps raw filter expressions usable for debugging
//! and keeps a broken manifest from taking grading down with it.

use crate::catalog::Catalog;
use tracing::warn;

/// Selection expression used when the caller names no task at all.
pub const DEFAULT_FILTER: &str = "cat == Graded";

/// Resolve against the current catalog snapshot.
///
/// Catalog load failures degrade to pass-through rather than erroring: the
/// caller's input may already be a valid filter expression.
pub fn resolve(raw: &str) -> String {
    match Catalog::load() {
        Ok(catalog) => resolve_with(&catalog, raw),
        Err(e) => {
            warn!("task catalog unavailable, passing filter through verbatim: {e}");
            if raw.trim().is_empty() {
                DEFAULT_FILTER.to_string()
            } else {
                raw.to_string()
            }
        }
    }
}

/// Resolve against an explicit catalog snapshot.
pub fn resolve_with(catalog: &Catalog, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_FILTER.to_string();
    }
    match catalog.find_by_name(trimmed) {
        Some(task) => task.filter.clone(),
        None => {
            warn!("no catalog task named '{trimmed}', treating it as a raw filter");
            trimmed.to_string()
        }
    }
}
