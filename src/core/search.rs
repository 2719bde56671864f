// laralog - core/search.rs
//
// Search/filter engine: parses candidate files, filters, sorts newest first,
// truncates, and memoises whole results in an LRU cache keyed by the query
// fingerprint.
//
// The cache lives behind a Mutex so a shared `&SearchEngine` is safe across
// threads. Each get or set is one critical section; parsing happens outside
// the lock, so two concurrent misses for the same key both compute and the
// later `set` wins.

use crate::core::cache::{CacheStats, LruCache};
use crate::core::filter::apply_filters;
use crate::core::model::{LogEntry, LogFile};
use crate::core::parser::{parse_stream, CancelFlag, LogOpener};
use crate::core::query::{fingerprint, SearchQuery, SearchResult};
use crate::util::constants;
use crate::util::error::{ParseError, SearchError};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// What to do when one candidate file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole search with the file's error.
    #[default]
    Abort,
    /// Log the failure, count it in `files_failed`, and continue.
    SkipFailing,
}

/// Engine construction options.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub cache_capacity: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            cache_capacity: constants::DEFAULT_CACHE_CAPACITY,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

pub struct SearchEngine<O> {
    opener: O,
    cache: Mutex<LruCache<String, SearchResult>>,
    failure_policy: FailurePolicy,
}

impl<O: LogOpener> SearchEngine<O> {
    pub fn new(opener: O) -> Self {
        Self::with_options(opener, SearchOptions::default())
    }

    pub fn with_options(opener: O, options: SearchOptions) -> Self {
        Self {
            opener,
            cache: Mutex::new(LruCache::new(options.cache_capacity)),
            failure_policy: options.failure_policy,
        }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Run `query` over `files`, returning at most `max_entries` entries.
    pub fn search(
        &self,
        query: &SearchQuery,
        files: &[LogFile],
        max_entries: usize,
    ) -> Result<SearchResult, SearchError> {
        self.run(query, files, max_entries, None)
    }

    /// As `search`, checking `cancel` between files and between entries.
    pub fn search_with_cancel(
        &self,
        query: &SearchQuery,
        files: &[LogFile],
        max_entries: usize,
        cancel: &CancelFlag,
    ) -> Result<SearchResult, SearchError> {
        self.run(query, files, max_entries, Some(cancel))
    }

    /// Drop every cached result, e.g. on an explicit user refresh.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
        tracing::debug!("Search cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, SearchResult>> {
        // The cache holds plain values; a panic elsewhere cannot leave it
        // half-updated, so a poisoned lock is still usable.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(
        &self,
        query: &SearchQuery,
        files: &[LogFile],
        max_entries: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let key = fingerprint(query, files);

        let cached = self.lock_cache().get(&key).cloned();
        if let Some(mut result) = cached {
            result.execution_time = started.elapsed();
            tracing::debug!(
                entries = result.entries.len(),
                total = result.total,
                "Search served from cache"
            );
            return Ok(result);
        }

        let candidates: Vec<&LogFile> = files.iter().filter(|f| query.includes_file(f)).collect();
        let per_file_cap = max_entries.saturating_mul(constants::PARSE_SLACK_FACTOR);

        tracing::debug!(
            files = candidates.len(),
            per_file_cap,
            max_entries,
            "Search cache miss; parsing candidate files"
        );

        let mut combined: Vec<LogEntry> = Vec::new();
        let mut files_failed = 0;

        for (completed, file) in candidates.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                return Err(SearchError::Cancelled {
                    files_completed: completed,
                });
            }

            match self.parse_one(&file.path, per_file_cap, cancel) {
                Ok(entries) => combined.extend(entries),
                Err(ParseError::Cancelled { .. }) => {
                    return Err(SearchError::Cancelled {
                        files_completed: completed,
                    });
                }
                Err(e) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(SearchError::File {
                            file: file.path.clone(),
                            source: e,
                        });
                    }
                    FailurePolicy::SkipFailing => {
                        tracing::warn!(
                            file = %file.path.display(),
                            error = %e,
                            "Skipping unreadable log file"
                        );
                        files_failed += 1;
                    }
                },
            }
        }

        let mut matched = apply_filters(combined, query);
        // Stable: equal timestamps keep file order, then line order.
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total = matched.len();
        matched.truncate(max_entries);

        let result = SearchResult {
            entries: matched,
            total,
            execution_time: started.elapsed(),
            files_searched: candidates.len(),
            files_failed,
        };

        tracing::debug!(
            total,
            returned = result.entries.len(),
            files_failed,
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Search complete"
        );

        self.lock_cache().set(key, result.clone());
        Ok(result)
    }

    fn parse_one(
        &self,
        path: &Path,
        cap: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<LogEntry>, ParseError> {
        let stream = parse_stream(&self.opener, path, cap)?;
        match cancel {
            Some(flag) => stream.with_cancel(Arc::clone(flag)).collect(),
            None => stream.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{LogFileType, LogLevel};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::io::{self, BufRead, Cursor};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    /// In-memory files with an open counter.
    #[derive(Default)]
    struct MemoryOpener {
        files: HashMap<PathBuf, String>,
        opens: AtomicUsize,
    }

    impl MemoryOpener {
        fn with(mut self, path: &str, content: &str) -> Self {
            self.files.insert(PathBuf::from(path), content.to_string());
            self
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }
    }

    impl LogOpener for MemoryOpener {
        fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match self.files.get(path) {
                Some(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            }
        }
    }

    fn log_file(path: &str, mtime_secs: i64) -> LogFile {
        LogFile {
            path: PathBuf::from(path),
            size: 0,
            modified: Utc.timestamp_opt(mtime_secs, 0).unwrap(),
            file_type: LogFileType::Custom,
        }
    }

    const APP_LOG: &str = "\
[2024-01-15 10:00:00] local.DEBUG: cache warmed
[2024-01-15 10:05:00] local.ERROR: Gateway timeout calling payments
Stack trace:
#0 /app/Http/Client.php(88): send()
[2024-01-15 10:10:00] local.INFO: request served
[2024-01-15 10:15:00] production.ERROR: Database TIMEOUT
";

    const WORKER_LOG: &str = "\
[2024-01-15 10:07:00] worker.ERROR: job failed
[2024-01-15 10:12:00] worker.WARNING: queue timeout approaching
";

    fn engine() -> SearchEngine<MemoryOpener> {
        SearchEngine::new(
            MemoryOpener::default()
                .with("/logs/laravel.log", APP_LOG)
                .with("/logs/worker.log", WORKER_LOG),
        )
    }

    fn files() -> Vec<LogFile> {
        vec![log_file("/logs/laravel.log", 1), log_file("/logs/worker.log", 1)]
    }

    #[test]
    fn test_results_are_newest_first_across_files() {
        let engine = engine();
        let result = engine.search(&SearchQuery::new(), &files(), 100).unwrap();

        assert_eq!(result.total, 6);
        assert_eq!(result.files_searched, 2);
        let minutes: Vec<String> = result
            .entries
            .iter()
            .map(|e| e.timestamp.format("%M").to_string())
            .collect();
        assert_eq!(minutes, ["15", "12", "10", "07", "05", "00"]);
    }

    #[test]
    fn test_filter_conjunction_over_files() {
        let engine = engine();
        let query = SearchQuery::new()
            .with_levels([LogLevel::Error])
            .with_keyword("timeout");
        let result = engine.search(&query, &files(), 100).unwrap();

        let ids: Vec<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["/logs/laravel.log:6", "/logs/laravel.log:2"]);
        assert_eq!(result.entries[1].stack_trace.len(), 1);
    }

    #[test]
    fn test_truncation_keeps_total_before_cap() {
        let engine = engine();
        let result = engine.search(&SearchQuery::new(), &files(), 2).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.total, 6);
    }

    #[test]
    fn test_per_file_parse_uses_slack_factor() {
        let engine = engine();
        // Cap 1 -> 2 entries per file -> 4 candidates.
        let result = engine.search(&SearchQuery::new(), &files(), 1).unwrap();
        assert_eq!(result.total, 4);
        assert_eq!(result.entries[0].message, "queue timeout approaching");
    }

    #[test]
    fn test_identical_search_is_served_from_cache() {
        let engine = engine();
        let query = SearchQuery::new().with_keyword("timeout");

        let first = engine.search(&query, &files(), 100).unwrap();
        assert_eq!(engine.opener().opens(), 2);

        let second = engine.search(&query, &files(), 100).unwrap();
        assert_eq!(engine.opener().opens(), 2, "second search must not reparse");
        assert_eq!(first.entries, second.entries);
        assert_eq!(first.total, second.total);
        assert_eq!(first.files_searched, second.files_searched);
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn test_modified_file_invalidates_cache_key() {
        let engine = engine();
        engine.search(&SearchQuery::new(), &files(), 100).unwrap();

        let touched = vec![log_file("/logs/laravel.log", 2), log_file("/logs/worker.log", 1)];
        engine.search(&SearchQuery::new(), &touched, 100).unwrap();
        assert_eq!(engine.opener().opens(), 4);
    }

    #[test]
    fn test_clear_cache_forces_reparse() {
        let engine = engine();
        engine.search(&SearchQuery::new(), &files(), 100).unwrap();
        engine.clear_cache();
        engine.search(&SearchQuery::new(), &files(), 100).unwrap();
        assert_eq!(engine.opener().opens(), 4);
    }

    #[test]
    fn test_file_filter_limits_candidates() {
        let engine = engine();
        let query = SearchQuery::new().with_files(["/logs/worker.log"]);
        let result = engine.search(&query, &files(), 100).unwrap();

        assert_eq!(result.files_searched, 1);
        assert_eq!(result.total, 2);
        assert_eq!(engine.opener().opens(), 1);
    }

    #[test]
    fn test_unreadable_file_aborts_by_default() {
        let engine = engine();
        let mut candidates = files();
        candidates.insert(1, log_file("/logs/missing.log", 1));

        let err = engine.search(&SearchQuery::new(), &candidates, 100).unwrap_err();
        match err {
            SearchError::File { file, .. } => assert_eq!(file, PathBuf::from("/logs/missing.log")),
            other => panic!("expected File error, got {other:?}"),
        }
        assert_eq!(engine.cache_stats().len, 0);
    }

    #[test]
    fn test_skip_failing_policy_continues() {
        let engine = SearchEngine::with_options(
            MemoryOpener::default().with("/logs/laravel.log", APP_LOG),
            SearchOptions {
                failure_policy: FailurePolicy::SkipFailing,
                ..SearchOptions::default()
            },
        );
        let candidates = vec![log_file("/logs/gone.log", 1), log_file("/logs/laravel.log", 1)];
        let result = engine.search(&SearchQuery::new(), &candidates, 100).unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.files_searched, 2);
        assert_eq!(result.files_failed, 1);
    }

    #[test]
    fn test_raised_cancel_flag_stops_search() {
        let engine = engine();
        let cancel: CancelFlag = Arc::new(AtomicBool::new(true));
        let err = engine
            .search_with_cancel(&SearchQuery::new(), &files(), 100, &cancel)
            .unwrap_err();
        assert!(matches!(err, SearchError::Cancelled { files_completed: 0 }));
        assert_eq!(engine.opener().opens(), 0);
    }

    #[test]
    fn test_cache_capacity_evicts_old_queries() {
        let engine = SearchEngine::with_options(
            MemoryOpener::default().with("/logs/laravel.log", APP_LOG),
            SearchOptions {
                cache_capacity: 2,
                ..SearchOptions::default()
            },
        );
        let candidates = vec![log_file("/logs/laravel.log", 1)];
        for keyword in ["a", "b", "c"] {
            let query = SearchQuery::new().with_keyword(keyword);
            engine.search(&query, &candidates, 10).unwrap();
        }
        let stats = engine.cache_stats();
        assert_eq!(stats.len, 2);
        assert_eq!(stats.evictions, 1);

        // "a" was evicted and must be recomputed.
        engine
            .search(&SearchQuery::new().with_keyword("a"), &candidates, 10)
            .unwrap();
        assert_eq!(engine.opener().opens(), 4);
    }
}
