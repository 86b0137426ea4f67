//! Short stable keys for canonical filters.
//!
//! Used to correlate log lines for the same query across controller events.
//! Name lists are sorted first so that equal filters share a key.

use sha2::{Digest, Sha256};

use crate::models::filter::{CanonicalFilter, CompanyScope};

/// Hex SHA-256 of the filter's canonical text form.
pub fn filter_key(filter: &CanonicalFilter) -> String {
    let company = match &filter.company {
        CompanyScope::Unrestricted => "*",
        CompanyScope::Company(id) => id.as_str(),
    };
    hash(&format!(
        "{}:{}:{}:{}:{company}",
        filter.date_range.start,
        filter.date_range.end,
        filter.closers.sorted().join("\u{1f}"),
        filter.setters.sorted().join("\u{1f}"),
    ))
}

/// First twelve hex digits, enough to tell queries apart in a log.
pub fn short_key(filter: &CanonicalFilter) -> String {
    let mut key = filter_key(filter);
    key.truncate(12);
    key
}

fn hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
