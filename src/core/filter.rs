// laralog - core/filter.rs
//
// Filter predicates for log entries.
// All present conditions are AND-combined; absent or empty ones pass.
// Core layer: pure logic, no I/O.

use crate::core::model::LogEntry;
use crate::core::query::SearchQuery;

/// Keep only the entries that satisfy every condition of `query`.
pub fn apply_filters(entries: Vec<LogEntry>, query: &SearchQuery) -> Vec<LogEntry> {
    if query.is_empty() {
        return entries;
    }

    let keyword = query.keyword_lower();

    entries
        .into_iter()
        .filter(|entry| matches_all(entry, query, keyword.as_deref()))
        .collect()
}

/// Check a single entry against `query`.
pub fn matches_query(entry: &LogEntry, query: &SearchQuery) -> bool {
    matches_all(entry, query, query.keyword_lower().as_deref())
}

/// `keyword_lower` is passed in so a batch lower-cases the keyword once.
fn matches_all(entry: &LogEntry, query: &SearchQuery, keyword_lower: Option<&str>) -> bool {
    // Keyword: message OR environment
    if let Some(keyword) = keyword_lower {
        let in_message = entry.message.to_lowercase().contains(keyword);
        if !in_message && !entry.environment.to_lowercase().contains(keyword) {
            return false;
        }
    }

    if let Some(levels) = &query.levels {
        if !levels.is_empty() && !levels.contains(&entry.level) {
            return false;
        }
    }

    // Environment membership is exact, unlike the keyword match.
    if let Some(environments) = &query.environments {
        if !environments.is_empty() && !environments.contains(&entry.environment) {
            return false;
        }
    }

    if let Some(range) = &query.date_range {
        if !range.contains(entry.timestamp) {
            return false;
        }
    }

    true
}
