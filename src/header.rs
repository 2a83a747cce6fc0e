//! Header resolver: derives the ordered attribute vector (and its
//! positional inverse) from a fact stream and a caller-supplied priority
//! map.

use crate::types::{build_col_index, ColumnIndex, Fact, Header, PriorityMap};
use crate::types::{EFFECTIVE_END_DATE, EFFECTIVE_START_DATE, SUBJECT_ID};

/// Collect the distinct attribute names from `facts` (first-seen order)
/// and sort them by `(priority.get(x, +inf), x)`; attributes absent from
/// `priority` sort after all present ones, then lexicographically. The
/// fixed key prefix (`subject_id`, `effective_start_date`,
/// `effective_end_date`) is always prepended ahead of the sorted
/// attributes — the Header invariant that these three lead every table
/// holds regardless of what the caller's priority map says about them.
pub fn resolve_header(facts: &[Fact], priority: &PriorityMap) -> (Header, ColumnIndex) {
    let mut seen = Vec::new();
    for fact in facts {
        if !seen.contains(&fact.attribute) {
            seen.push(fact.attribute.clone());
        }
    }
    seen.sort_by(|a, b| sort_key(a, priority).cmp(&sort_key(b, priority)));

    let mut header: Header = vec![
        SUBJECT_ID.to_string(),
        EFFECTIVE_START_DATE.to_string(),
        EFFECTIVE_END_DATE.to_string(),
    ];
    header.extend(seen);

    let col_index = build_col_index(&header);
    (header, col_index)
}

fn sort_key(name: &str, priority: &PriorityMap) -> (i32, String) {
    (priority.get(name).copied().unwrap_or(i32::MAX), name.to_string())
}

/// Expand an existing header with any attributes introduced by `facts`
/// that are not already present, re-sorting the attribute columns (only)
/// by the same priority rule. The fixed key prefix is left untouched at
/// the front. Used once per merge batch, ahead of applying its updates.
pub fn expand_header(header: &Header, facts: &[Fact], priority: &PriorityMap) -> Header {
    let (update_header, _) = resolve_header(facts, priority);
    let new_columns: Vec<String> = update_header
        .into_iter()
        .skip(3)
        .filter(|c| !header.contains(c))
        .collect();

    if new_columns.is_empty() {
        return header.clone();
    }

    let mut attrs: Vec<String> = header.iter().skip(3).cloned().collect();
    attrs.extend(new_columns);
    attrs.sort_by(|a, b| sort_key(a, priority).cmp(&sort_key(b, priority)));

    let mut merged: Header = header.iter().take(3).cloned().collect();
    merged.extend(attrs);
    merged
}
