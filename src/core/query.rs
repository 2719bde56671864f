// laralog - core/query.rs
//
// Search request and result value types, and the deterministic fingerprint
// used to address the result cache.

use crate::core::model::{LogEntry, LogFile, LogLevel};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when `ts` lies in `[start, end]`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// A search request. Absent conditions always pass; present ones are ANDed.
///
/// Sets are ordered so the serialised form, and therefore the cache
/// fingerprint, does not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against message or environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<BTreeSet<LogLevel>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environments: Option<BTreeSet<String>>,

    /// Restrict the search to these candidate file paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeSet<String>>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.levels = Some(levels.into_iter().collect());
        self
    }

    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn with_environments<S: Into<String>>(
        mut self,
        environments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.environments = Some(environments.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Keyword to match, lower-cased. Empty keywords count as absent.
    pub fn keyword_lower(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns true if no entry-level condition is set.
    pub fn is_empty(&self) -> bool {
        self.keyword_lower().is_none()
            && self.levels.as_ref().map_or(true, BTreeSet::is_empty)
            && self.environments.as_ref().map_or(true, BTreeSet::is_empty)
            && self.date_range.is_none()
    }

    /// True when `file` passes the optional explicit file list.
    pub fn includes_file(&self, file: &LogFile) -> bool {
        match &self.files {
            Some(files) if !files.is_empty() => {
                files.contains(file.path.to_string_lossy().as_ref())
            }
            _ => true,
        }
    }
}

/// Outcome of one search.
///
/// Cached results are immutable snapshots; callers always receive a copy with
/// `execution_time` measured for their own call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Matching entries, newest first, truncated to the requested cap.
    pub entries: Vec<LogEntry>,

    /// Number of matching entries before truncation.
    pub total: usize,

    #[serde(rename = "executionTimeMs", with = "duration_ms")]
    pub execution_time: Duration,

    /// Candidate files searched.
    pub files_searched: usize,

    /// Files skipped because they could not be read. Always zero unless the
    /// engine runs with `FailurePolicy::SkipFailing`.
    #[serde(default)]
    pub files_failed: usize,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// =============================================================================
// Fingerprint
// =============================================================================

#[derive(Debug, Serialize)]
struct FingerprintInput<'a> {
    query: &'a SearchQuery,
    files: Vec<String>,
}

/// Deterministic cache key for a query over a candidate file list.
///
/// Each file contributes `path:modified`, so replacing or touching any file
/// changes the key without explicit invalidation.
pub fn fingerprint(query: &SearchQuery, files: &[LogFile]) -> String {
    let input = FingerprintInput {
        query,
        files: files
            .iter()
            .map(|f| {
                format!(
                    "{}:{}",
                    f.path.display(),
                    f.modified.to_rfc3339_opts(SecondsFormat::Nanos, true)
                )
            })
            .collect(),
    };
    serde_json::to_string(&input).unwrap_or_else(|_| format!("{input:?}"))
}
