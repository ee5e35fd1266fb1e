//! Column-name inference for heterogeneous ridership CSV schemas.
//!
//! Transit agencies publish the same data under wildly different headers
//! (`STOP_ID`, `stop id`, `Station-ID`, ...), so nothing downstream trusts a
//! column name before it has been resolved here.

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Picks the column matching a semantic field, given candidate names in
/// priority order.
///
/// Tries a normalized exact match first (case, spaces, hyphens and
/// underscores ignored), then falls back to a case-insensitive substring
/// search. Earlier candidates always win over later ones, even when a later
/// candidate would also match.
pub fn resolve_column<'a>(available: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    for cand in candidates {
        let key = normalize(cand);
        if let Some(col) = available.iter().find(|c| normalize(c) == key) {
            return Some(col.as_str());
        }
    }
    for cand in candidates {
        let needle = cand.to_lowercase();
        if let Some(col) = available
            .iter()
            .find(|c| c.to_lowercase().contains(&needle))
        {
            return Some(col.as_str());
        }
    }
    None
}
